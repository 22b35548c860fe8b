//! Where scene parameter values come from
//!
//! The scene reads parameters through [`ParameterSource`] so it runs the same
//! with compiled-in defaults, the live panel values, or a test map.

use std::collections::HashMap;

use super::control;

pub trait ParameterSource {
    /// Current value for `key`, if this source knows it
    fn value(&self, key: &str) -> Option<f32>;
}

/// The declared default of every standard parameter
#[derive(Debug, Clone, Copy, Default)]
pub struct CompiledDefaults;

impl ParameterSource for CompiledDefaults {
    fn value(&self, key: &str) -> Option<f32> {
        control::standard(key).map(|p| p.default)
    }
}

/// Values from `overrides` where present, otherwise from `base`
pub struct Layered<'a> {
    pub overrides: &'a dyn ParameterSource,
    pub base: &'a dyn ParameterSource,
}

impl<'a> Layered<'a> {
    pub fn new(overrides: &'a dyn ParameterSource, base: &'a dyn ParameterSource) -> Self {
        Self { overrides, base }
    }
}

impl ParameterSource for Layered<'_> {
    fn value(&self, key: &str) -> Option<f32> {
        self.overrides
            .value(key)
            .or_else(|| self.base.value(key))
    }
}

impl ParameterSource for HashMap<String, f32> {
    fn value(&self, key: &str) -> Option<f32> {
        self.get(key).copied()
    }
}

impl ParameterSource for HashMap<&str, f32> {
    fn value(&self, key: &str) -> Option<f32> {
        self.get(key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::keys;

    #[test]
    fn compiled_defaults_know_only_standard_keys() {
        assert_eq!(CompiledDefaults.value(keys::SERAPHIM_SCALE), Some(8.0));
        assert_eq!(CompiledDefaults.value(keys::DIRECTIONAL), Some(1.0));
        assert_eq!(CompiledDefaults.value("fog"), None);
    }

    #[test]
    fn layered_prefers_overrides() {
        let overrides = HashMap::from([(keys::AMBIENT, 1.5f32)]);
        let layered = Layered::new(&overrides, &CompiledDefaults);

        assert_eq!(layered.value(keys::AMBIENT), Some(1.5));
        assert_eq!(layered.value(keys::DIRECTIONAL), Some(1.0));
        assert_eq!(layered.value("fog"), None);
    }
}
