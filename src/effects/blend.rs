use crate::render::capabilities::RenderingCapabilities;

/// Abstract blend mode requested by the rendering engine.
///
/// A superset of what the drawing surface implements natively; see [`to_composite_operator`]
/// for how each mode is realized.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum BlendMode {
    #[default]
    Normal,
    Layer,
    Multiply,
    Add,
    Screen,
    Lighten,
    Darken,
    Difference,
    Overlay,
    HardLight,
    Alpha,
    Erase,
    Subtract,
    Invert,
    Shader,
}

impl BlendMode {
    pub const ALL: [BlendMode; 15] = [
        BlendMode::Normal,
        BlendMode::Layer,
        BlendMode::Multiply,
        BlendMode::Add,
        BlendMode::Screen,
        BlendMode::Lighten,
        BlendMode::Darken,
        BlendMode::Difference,
        BlendMode::Overlay,
        BlendMode::HardLight,
        BlendMode::Alpha,
        BlendMode::Erase,
        BlendMode::Subtract,
        BlendMode::Invert,
        BlendMode::Shader,
    ];

    /// Modes with no native operator; they render as `Normal`.
    pub fn is_degraded(self) -> bool {
        matches!(
            self,
            BlendMode::Subtract | BlendMode::Invert | BlendMode::Shader
        )
    }
}

/// Native composite operator of the drawing surface.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum CompositeOperator {
    #[default]
    SourceOver,
    Multiply,
    Screen,
    Lighten,
    Darken,
    Difference,
    Overlay,
    HardLight,
    DestinationIn,
    DestinationOut,
}

impl CompositeOperator {
    /// Native identifier, as a host drawing API names the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompositeOperator::SourceOver => "source-over",
            CompositeOperator::Multiply => "multiply",
            CompositeOperator::Screen => "screen",
            CompositeOperator::Lighten => "lighten",
            CompositeOperator::Darken => "darken",
            CompositeOperator::Difference => "difference",
            CompositeOperator::Overlay => "overlay",
            CompositeOperator::HardLight => "hard-light",
            CompositeOperator::DestinationIn => "destination-in",
            CompositeOperator::DestinationOut => "destination-out",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "source-over" => CompositeOperator::SourceOver,
            "multiply" => CompositeOperator::Multiply,
            "screen" => CompositeOperator::Screen,
            "lighten" => CompositeOperator::Lighten,
            "darken" => CompositeOperator::Darken,
            "difference" => CompositeOperator::Difference,
            "overlay" => CompositeOperator::Overlay,
            "hard-light" => CompositeOperator::HardLight,
            "destination-in" => CompositeOperator::DestinationIn,
            "destination-out" => CompositeOperator::DestinationOut,
            _ => return None,
        })
    }
}

impl std::fmt::Display for CompositeOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a blend mode onto the native composite operator.
///
/// `Add` is approximated with `screen`. `Subtract`, `Invert` and `Shader` have no native
/// counterpart: they render as `Normal` and emit a warning, never an error.
pub fn to_composite_operator(mode: BlendMode) -> CompositeOperator {
    match mode {
        BlendMode::Normal | BlendMode::Layer => CompositeOperator::SourceOver,
        BlendMode::Multiply => CompositeOperator::Multiply,
        BlendMode::Add | BlendMode::Screen => CompositeOperator::Screen,
        BlendMode::Lighten => CompositeOperator::Lighten,
        BlendMode::Darken => CompositeOperator::Darken,
        BlendMode::Difference => CompositeOperator::Difference,
        BlendMode::Overlay => CompositeOperator::Overlay,
        BlendMode::HardLight => CompositeOperator::HardLight,
        BlendMode::Alpha => CompositeOperator::DestinationIn,
        BlendMode::Erase => CompositeOperator::DestinationOut,
        BlendMode::Subtract | BlendMode::Invert | BlendMode::Shader => {
            tracing::warn!(?mode, "blend mode not fully supported, rendering as Normal");
            CompositeOperator::SourceOver
        }
    }
}

/// True when `mode` is known to be disproportionately slow on this host at large surface sizes.
///
/// This is host data: the answer comes from [`RenderingCapabilities::slow_blend_modes`], never
/// from a constant.
pub fn is_expensive_at_scale(mode: BlendMode, caps: &RenderingCapabilities) -> bool {
    caps.slow_blend_modes.contains(&mode)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
