//! Live-tunable scene parameters
//!
//! [`ParameterSet`] holds the values the panel edits. The scene never owns
//! one; it reads a [`SceneParams`] snapshot from whatever
//! [`ParameterSource`] it is given each frame.

pub mod control;
pub mod source;

use thiserror::Error;

use crate::placement::Transform;

pub use control::{keys, ControlParameter, ParameterGroup, STANDARD_GROUPS, STANDARD_PARAMETERS};
pub use source::{CompiledDefaults, Layered, ParameterSource};

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    UnknownKey(String),
    #[error("parameter '{key}' cannot be set to {value}")]
    NotFinite { key: String, value: f32 },
}

/// Current values of a fixed list of parameters
#[derive(Debug, Clone)]
pub struct ParameterSet {
    groups: Vec<ParameterGroup>,
    parameters: Vec<ControlParameter>,
}

impl ParameterSet {
    pub fn new(groups: Vec<ParameterGroup>, parameters: Vec<ControlParameter>) -> Self {
        Self { groups, parameters }
    }

    /// Every standard parameter at its default
    pub fn standard() -> Self {
        Self::new(STANDARD_GROUPS.to_vec(), STANDARD_PARAMETERS.to_vec())
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.parameter(key).map(|p| p.value)
    }

    /// Stores `value` clamped to the parameter's range and returns the stored value
    pub fn set(&mut self, key: &str, value: f32) -> Result<f32, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite {
                key: key.to_string(),
                value,
            });
        }
        let parameter = self
            .parameters
            .iter_mut()
            .find(|p| p.key == key)
            .ok_or_else(|| ParamError::UnknownKey(key.to_string()))?;
        Ok(parameter.set(value))
    }

    pub fn reset(&mut self) {
        for parameter in &mut self.parameters {
            parameter.reset();
        }
    }

    pub fn parameter(&self, key: &str) -> Option<&ControlParameter> {
        self.parameters.iter().find(|p| p.key == key)
    }

    pub fn parameters(&self) -> &[ControlParameter] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [ControlParameter] {
        &mut self.parameters
    }

    pub fn groups(&self) -> &[ParameterGroup] {
        &self.groups
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl ParameterSource for ParameterSet {
    fn value(&self, key: &str) -> Option<f32> {
        self.get(key)
    }
}

/// Depth of field controls as read from the parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthOfFieldParams {
    pub focus_distance: f32,
    pub focal_length: f32,
    pub bokeh_scale: f32,
}

/// Typed snapshot of the scene parameters for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub seraphim: Transform,
    pub depth_of_field: DepthOfFieldParams,
}

impl SceneParams {
    /// Reads every parameter from `source`, falling back to the compiled
    /// default for keys it does not provide. Values are clamped to the
    /// standard range; non-finite values read as the default.
    pub fn from_source(source: &dyn ParameterSource) -> Self {
        let layered = Layered::new(source, &CompiledDefaults);
        let read = |key: &str| {
            let value = layered.value(key).filter(|v| v.is_finite());
            match control::standard(key) {
                Some(parameter) => value.map_or(parameter.default, |v| parameter.clamp(v)),
                None => value.unwrap_or_default(),
            }
        };
        let scale = read(keys::SERAPHIM_SCALE);

        Self {
            ambient_intensity: read(keys::AMBIENT),
            directional_intensity: read(keys::DIRECTIONAL),
            seraphim: Transform::new(
                [
                    read(keys::SERAPHIM_POS_X),
                    read(keys::SERAPHIM_POS_Y),
                    read(keys::SERAPHIM_POS_Z),
                ],
                [scale, scale, scale],
                [read(keys::SERAPHIM_ROT_X), 0.0, 0.0],
            ),
            depth_of_field: DepthOfFieldParams {
                focus_distance: read(keys::FOCUS_DISTANCE),
                focal_length: read(keys::FOCAL_LENGTH),
                bokeh_scale: read(keys::BOKEH_SCALE),
            },
        }
    }
}

impl Default for SceneParams {
    fn default() -> Self {
        Self::from_source(&CompiledDefaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_give_the_fixed_seraphim_placement() {
        let params = SceneParams::default();
        assert_eq!(
            params.seraphim,
            Transform::new([-0.5, 13.0, -2.0], [8.0; 3], [-0.2, 0.0, 0.0])
        );
        assert_eq!(params.ambient_intensity, 0.5);
        assert_eq!(params.directional_intensity, 1.0);
        assert_eq!(params.depth_of_field.bokeh_scale, 2.0);
    }

    #[test]
    fn set_clamps_and_rejects_unknown_keys() {
        let mut set = ParameterSet::standard();
        assert_eq!(set.set(keys::SERAPHIM_SCALE, 20.0), Ok(20.0));
        assert_eq!(set.get(keys::SERAPHIM_SCALE), Some(20.0));
        assert_eq!(set.set(keys::AMBIENT, 9.0), Ok(2.0));
        assert_eq!(
            set.set("fog", 1.0),
            Err(ParamError::UnknownKey("fog".to_string()))
        );
        assert!(matches!(
            set.set(keys::AMBIENT, f32::NAN),
            Err(ParamError::NotFinite { .. })
        ));

        set.reset();
        assert_eq!(set.get(keys::SERAPHIM_SCALE), Some(8.0));
    }

    #[test]
    fn partial_sources_fall_back_per_key() {
        let overrides = HashMap::from([(keys::SERAPHIM_SCALE.to_string(), 20.0f32)]);
        let params = SceneParams::from_source(&overrides);
        assert_eq!(params.seraphim.scale, [20.0, 20.0, 20.0]);
        assert_eq!(params.seraphim.position, [-0.5, 13.0, -2.0]);
    }

    #[test]
    fn injected_values_are_clamped_to_the_standard_ranges() {
        let params = SceneParams::from_source(&HashMap::from([
            (keys::SERAPHIM_SCALE, 0.0f32),
            (keys::AMBIENT, -1.0),
        ]));
        assert!(!params.seraphim.is_degenerate());
        assert_eq!(params.seraphim.scale, [0.1; 3]);
        assert_eq!(params.ambient_intensity, 0.0);
    }

    #[test]
    fn non_finite_injected_values_read_as_defaults() {
        let params = SceneParams::from_source(&HashMap::from([
            (keys::SERAPHIM_SCALE, f32::NAN),
            (keys::DIRECTIONAL, f32::INFINITY),
        ]));
        assert_eq!(params.seraphim.scale, [8.0; 3]);
        assert_eq!(params.directional_intensity, 1.0);
    }

    #[test]
    fn live_set_feeds_scene_params() {
        let mut set = ParameterSet::standard();
        set.set(keys::SERAPHIM_POS_Y, 4.0).unwrap();
        set.set(keys::FOCUS_DISTANCE, 0.5).unwrap();

        let params = SceneParams::from_source(&set);
        assert_eq!(params.seraphim.position[1], 4.0);
        assert_eq!(params.depth_of_field.focus_distance, 0.5);
    }
}
