use super::*;
use crate::render::capabilities::HostProfile;

#[test]
fn every_mode_maps_to_a_named_operator() {
    for mode in BlendMode::ALL {
        let op = to_composite_operator(mode);
        assert!(!op.as_str().is_empty(), "{mode:?}");
        assert_eq!(CompositeOperator::parse(op.as_str()), Some(op));
    }
}

#[test]
fn normal_and_layer_are_source_over() {
    assert_eq!(
        to_composite_operator(BlendMode::Normal),
        CompositeOperator::SourceOver
    );
    assert_eq!(
        to_composite_operator(BlendMode::Layer),
        CompositeOperator::SourceOver
    );
}

#[test]
fn add_is_approximated_by_screen() {
    assert_eq!(
        to_composite_operator(BlendMode::Add),
        CompositeOperator::Screen
    );
}

#[test]
fn alpha_and_erase_use_destination_operators() {
    assert_eq!(
        to_composite_operator(BlendMode::Alpha).as_str(),
        "destination-in"
    );
    assert_eq!(
        to_composite_operator(BlendMode::Erase).as_str(),
        "destination-out"
    );
}

#[test]
fn unsupported_modes_degrade_to_normal() {
    for mode in [BlendMode::Subtract, BlendMode::Invert, BlendMode::Shader] {
        assert!(mode.is_degraded());
        assert_eq!(to_composite_operator(mode), CompositeOperator::SourceOver);
    }
}

#[test]
fn expense_predicate_follows_host_profile() {
    let standard = RenderingCapabilities::for_host(HostProfile::Standard);
    let slow = RenderingCapabilities::for_host(HostProfile::SlowDestinationIn);
    for mode in BlendMode::ALL {
        assert!(!is_expensive_at_scale(mode, &standard));
        assert_eq!(is_expensive_at_scale(mode, &slow), mode == BlendMode::Alpha);
    }
}
