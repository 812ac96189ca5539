#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn empty_object_uses_defaults() {
    let cfg = SignerConfig::from_json("{}").unwrap();
    assert_eq!(cfg, SignerConfig::default());
    assert_eq!(cfg.zoom_step, ZoomStep::Ratio);
    assert_eq!(cfg.container_border, 2.0);
    assert_eq!(cfg.scroll_chain_step, 20.0);
}

#[test]
fn container_overrides_parse() {
    let cfg = SignerConfig::from_json(r#"{"container_width": 640, "container_height": 480}"#).unwrap();
    assert_eq!(cfg.container_width, Some(640.0));
    assert_eq!(cfg.container_height, Some(480.0));
}

#[test]
fn fixed_zoom_step_parses() {
    let cfg = SignerConfig::from_json(r#"{"zoom_step": {"mode": "fixed", "increment": 0.1}}"#).unwrap();
    assert_eq!(cfg.zoom_step, ZoomStep::Fixed { increment: 0.1 });
}

#[test]
fn malformed_json_is_config_error() {
    let err = SignerConfig::from_json("{not json").unwrap_err();
    assert!(matches!(err, SignerError::Config(_)));
}

#[test]
fn negative_override_rejected() {
    let err = SignerConfig::from_json(r#"{"container_width": -5}"#).unwrap_err();
    assert!(matches!(err, SignerError::InvalidConfig(ref m) if m.contains("container_width")));
}

#[test]
fn zero_fixed_increment_rejected() {
    let cfg = SignerConfig { zoom_step: ZoomStep::Fixed { increment: 0.0 }, ..SignerConfig::default() };
    assert!(cfg.validate().is_err());
}

#[test]
fn ratio_step_multiplies() {
    assert!((ZoomStep::Ratio.zoom_in(1.0) - 1.2).abs() < 1e-12);
    assert!((ZoomStep::Ratio.zoom_out(1.2) - 1.0).abs() < 1e-12);
}

#[test]
fn fixed_step_adds() {
    let step = ZoomStep::Fixed { increment: 0.1 };
    assert!((step.zoom_in(1.0) - 1.1).abs() < 1e-12);
    assert!((step.zoom_out(1.0) - 0.9).abs() < 1e-12);
}
