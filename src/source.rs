//! Document source references and file-type detection.

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;

use crate::error::SignerError;

/// What the source decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Multi-page document rendered by the page renderer.
    Pdf,
    /// Single raster image shown as one page.
    Image,
}

/// A document or image location plus its detected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub location: String,
    pub kind: SourceKind,
}

impl Source {
    /// Detect the kind from the location's extension.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSourceType` for anything other than pdf/jpg/jpeg/png.
    pub fn parse(location: &str) -> Result<Self, SignerError> {
        let ext = file_extension(location).to_ascii_lowercase();
        let kind = match ext.as_str() {
            "pdf" => SourceKind::Pdf,
            "jpg" | "jpeg" | "png" => SourceKind::Image,
            _ => return Err(SignerError::UnsupportedSourceType(ext)),
        };
        Ok(Self { location: location.to_string(), kind })
    }

    #[must_use]
    pub fn with_kind(location: &str, kind: SourceKind) -> Self {
        Self { location: location.to_string(), kind }
    }
}

/// Extension of a URL or file name, ignoring any query string or fragment.
#[must_use]
pub fn file_extension(location: &str) -> &str {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(i) => &name[i + 1..],
        None => "",
    }
}
