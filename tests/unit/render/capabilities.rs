use super::*;

#[test]
fn default_is_fast_host_with_native_filters() {
    let caps = RenderingCapabilities::default();
    assert!(caps.native_filter_graphs);
    assert!(caps.slow_blend_modes.is_empty());
    assert_eq!(caps.slow_blend_threshold, 512);
}

#[test]
fn emulation_requires_slow_mode_and_large_surface() {
    let caps = RenderingCapabilities::for_host(HostProfile::SlowDestinationIn);
    assert!(caps.should_emulate_blend(BlendMode::Alpha, 512, 16));
    assert!(caps.should_emulate_blend(BlendMode::Alpha, 16, 2048));
    assert!(!caps.should_emulate_blend(BlendMode::Alpha, 511, 511));
    assert!(!caps.should_emulate_blend(BlendMode::Multiply, 4096, 4096));

    let fast = RenderingCapabilities::for_host(HostProfile::Standard);
    assert!(!fast.should_emulate_blend(BlendMode::Alpha, 4096, 4096));
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let caps =
        RenderingCapabilities::from_json(r#"{ "slow_blend_modes": ["Alpha", "Erase"] }"#).unwrap();
    assert_eq!(
        caps.slow_blend_modes,
        vec![BlendMode::Alpha, BlendMode::Erase]
    );
    assert!(caps.native_filter_graphs);
    assert_eq!(caps.slow_blend_threshold, DEFAULT_SLOW_BLEND_THRESHOLD);
}

#[test]
fn json_rejects_bad_input() {
    assert!(matches!(
        RenderingCapabilities::from_json("{ nope"),
        Err(TesseraError::Serde(_))
    ));
    assert!(matches!(
        RenderingCapabilities::from_json(r#"{ "slow_blend_threshold": 0 }"#),
        Err(TesseraError::Validation(_))
    ));
}

#[test]
fn overrides_apply_parsable_values_only() {
    let caps = RenderingCapabilities::default().with_overrides(|key| match key {
        "TESSERA_NATIVE_FILTERS" => Some("off".to_string()),
        "TESSERA_SLOW_BLEND_THRESHOLD" => Some("1024".to_string()),
        _ => None,
    });
    assert!(!caps.native_filter_graphs);
    assert_eq!(caps.slow_blend_threshold, 1024);

    let caps = RenderingCapabilities::default().with_overrides(|key| match key {
        "TESSERA_NATIVE_FILTERS" => Some("maybe".to_string()),
        "TESSERA_SLOW_BLEND_THRESHOLD" => Some("0".to_string()),
        _ => None,
    });
    assert_eq!(caps, RenderingCapabilities::default());
}
