//! Pan/zoom, annotation, and export core for an in-browser PDF and image
//! signing widget.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It keeps a
//! stack of rendered pages on a canvas, keeps the viewport inside the page
//! envelope while the user drags, pinches, or scrolls, collects signatures,
//! drawings, images, and text boxes, and burns them back into the source
//! document on export. PDF parsing, page rasterization, and pixel painting
//! belong to the host; they reach the engine through the traits in
//! [`services`], and the engine answers with [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and the testable [`engine::EngineCore`] |
//! | [`viewport`] | Zoom, pan, page navigation, and the gesture state machine |
//! | [`boundary`] | Pan envelope, zoom range, and axis-locked clamping |
//! | [`transform`] | Canvas-to-native page coordinate mapping |
//! | [`annotation`] | Annotation types, the annotation store, and page grouping |
//! | [`export`] | Embedding annotations into the native document |
//! | [`layout`] | Vertical page stack |
//! | [`input`] | Drawing tools and pointer event types |
//! | [`geometry`] | Points, sizes, rectangles, and the viewport transform |
//! | [`source`] | Source location parsing and file-type detection |
//! | [`services`] | Collaborator traits the host implements |
//! | [`dom`] | Browser [`services::HostSurface`] over `web-sys` |
//! | [`config`] | JSON configuration |
//! | [`error`] | Error taxonomy and stable error codes |
//! | [`consts`] | Shared numeric constants (page gap, zoom limits, stroke widths) |

pub mod annotation;
pub mod boundary;
pub mod config;
pub mod consts;
pub mod dom;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod services;
pub mod source;
pub mod transform;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_helpers;
