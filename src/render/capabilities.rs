use crate::effects::blend::{BlendMode, is_expensive_at_scale};
use crate::foundation::error::{TesseraError, TesseraResult};

/// Largest backing-surface dimension at which the native slow blend path still performs.
pub const DEFAULT_SLOW_BLEND_THRESHOLD: u32 = 512;

/// Known host families, as reported by platform detection outside this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HostProfile {
    #[default]
    Standard,
    /// Hosts whose `destination-in` operator degrades sharply on large surfaces.
    SlowDestinationIn,
}

/// What the host drawing surface can do, computed once when the render context is built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderingCapabilities {
    pub native_filter_graphs: bool,
    pub slow_blend_modes: Vec<BlendMode>,
    /// Backing surfaces whose larger side is at or above this size route slow modes through the
    /// blend scratch surface.
    pub slow_blend_threshold: u32,
}

impl Default for RenderingCapabilities {
    fn default() -> Self {
        Self {
            native_filter_graphs: true,
            slow_blend_modes: Vec::new(),
            slow_blend_threshold: DEFAULT_SLOW_BLEND_THRESHOLD,
        }
    }
}

impl RenderingCapabilities {
    pub fn for_host(profile: HostProfile) -> Self {
        match profile {
            HostProfile::Standard => Self::default(),
            HostProfile::SlowDestinationIn => Self {
                slow_blend_modes: vec![BlendMode::Alpha],
                ..Self::default()
            },
        }
    }

    pub fn with_native_filter_graphs(mut self, supported: bool) -> Self {
        self.native_filter_graphs = supported;
        self
    }

    pub fn from_json(json: &str) -> TesseraResult<Self> {
        let caps: Self =
            serde_json::from_str(json).map_err(|e| TesseraError::serde(e.to_string()))?;
        if caps.slow_blend_threshold == 0 {
            return Err(TesseraError::validation("slow_blend_threshold must be > 0"));
        }
        Ok(caps)
    }

    /// Applies `TESSERA_NATIVE_FILTERS` and `TESSERA_SLOW_BLEND_THRESHOLD` from the environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup. Unparsable values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("TESSERA_NATIVE_FILTERS") {
            match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.native_filter_graphs = true,
                "0" | "false" | "no" | "off" => self.native_filter_graphs = false,
                other => tracing::debug!(value = other, "ignoring TESSERA_NATIVE_FILTERS"),
            }
        }
        if let Some(n) = lookup("TESSERA_SLOW_BLEND_THRESHOLD")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            self.slow_blend_threshold = n;
        }
        self
    }

    /// Both the mode-expense predicate and the size threshold must hold.
    pub fn should_emulate_blend(&self, mode: BlendMode, surface_w: u32, surface_h: u32) -> bool {
        is_expensive_at_scale(mode, self) && surface_w.max(surface_h) >= self.slow_blend_threshold
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/capabilities.rs"]
mod tests;
