//! Declarations of the tunable scene parameters

use std::f32::consts::PI;

/// Keys of the standard parameters
pub mod keys {
    pub const AMBIENT: &str = "ambi";
    pub const DIRECTIONAL: &str = "dirLight";
    pub const SERAPHIM_POS_X: &str = "seraphimPosX";
    pub const SERAPHIM_POS_Y: &str = "seraphimPosY";
    pub const SERAPHIM_POS_Z: &str = "seraphimPosZ";
    pub const SERAPHIM_SCALE: &str = "seraphimScale";
    pub const SERAPHIM_ROT_X: &str = "seraphimRotX";
    pub const FOCUS_DISTANCE: &str = "focusDistance";
    pub const FOCAL_LENGTH: &str = "focalLength";
    pub const BOKEH_SCALE: &str = "bokehScale";
}

/// One live-adjustable float with its range, slider step and panel placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParameter {
    pub key: &'static str,
    pub value: f32,
    pub default: f32,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub label: &'static str,
    pub group: &'static str,
}

impl ControlParameter {
    /// Parameter at its default value, labelled with its key
    pub const fn new(
        group: &'static str,
        key: &'static str,
        default: f32,
        min: f32,
        max: f32,
        step: f32,
    ) -> Self {
        Self {
            key,
            value: default,
            default,
            min,
            max,
            step,
            label: key,
            group,
        }
    }

    pub const fn labeled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Nearest slider position: a whole number of steps above `min`, in range
    pub fn snap(&self, value: f32) -> f32 {
        if self.step <= 0.0 {
            return self.clamp(value);
        }
        let steps = ((value - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }

    /// Stores `value` clamped to the range and returns what was stored
    pub fn set(&mut self, value: f32) -> f32 {
        self.value = self.clamp(value);
        self.value
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }
}

/// A folder of parameters in the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterGroup {
    pub name: &'static str,
    /// Folded when the panel first opens
    pub collapsed: bool,
}

pub const LIGHTS: &str = "Lights";
pub const SERAPHIM: &str = "Seraphim";
pub const DEPTH_OF_FIELD: &str = "DepthOfField";

pub const STANDARD_GROUPS: [ParameterGroup; 3] = [
    ParameterGroup {
        name: LIGHTS,
        collapsed: true,
    },
    ParameterGroup {
        name: SERAPHIM,
        collapsed: false,
    },
    ParameterGroup {
        name: DEPTH_OF_FIELD,
        collapsed: true,
    },
];

#[rustfmt::skip]
pub const STANDARD_PARAMETERS: [ControlParameter; 10] = [
    ControlParameter::new(LIGHTS, keys::AMBIENT, 0.5, 0.0, 2.0, 0.1).labeled("Ambient Intensity"),
    ControlParameter::new(LIGHTS, keys::DIRECTIONAL, 1.0, 0.0, 5.0, 0.1).labeled("DirLight Intensity"),
    ControlParameter::new(SERAPHIM, keys::SERAPHIM_POS_X, -0.5, -50.0, 50.0, 0.1),
    ControlParameter::new(SERAPHIM, keys::SERAPHIM_POS_Y, 13.0, -50.0, 50.0, 0.1),
    ControlParameter::new(SERAPHIM, keys::SERAPHIM_POS_Z, -2.0, -50.0, 50.0, 0.1),
    ControlParameter::new(SERAPHIM, keys::SERAPHIM_SCALE, 8.0, 0.1, 50.0, 0.1),
    ControlParameter::new(SERAPHIM, keys::SERAPHIM_ROT_X, -0.2, -PI, PI, 0.01).labeled("Rotation X"),
    ControlParameter::new(DEPTH_OF_FIELD, keys::FOCUS_DISTANCE, 0.02, 0.0, 1.0, 0.001),
    ControlParameter::new(DEPTH_OF_FIELD, keys::FOCAL_LENGTH, 0.03, 0.0, 1.0, 0.001),
    ControlParameter::new(DEPTH_OF_FIELD, keys::BOKEH_SCALE, 2.0, 0.0, 10.0, 0.1),
];

/// Declaration of a standard parameter
pub fn standard(key: &str) -> Option<&'static ControlParameter> {
    STANDARD_PARAMETERS.iter().find(|p| p.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_parameters_sit_inside_their_ranges() {
        for p in &STANDARD_PARAMETERS {
            assert!(p.min <= p.default && p.default <= p.max, "{}", p.key);
            assert!(p.step > 0.0, "{}", p.key);
            assert!(
                STANDARD_GROUPS.iter().any(|g| g.name == p.group),
                "{} has no group",
                p.key
            );
        }
    }

    #[test]
    fn labels_default_to_keys() {
        assert_eq!(standard(keys::AMBIENT).unwrap().label, "Ambient Intensity");
        assert_eq!(standard(keys::SERAPHIM_ROT_X).unwrap().label, "Rotation X");
        assert_eq!(standard(keys::BOKEH_SCALE).unwrap().label, "bokehScale");
        assert!(standard("fog").is_none());
    }

    #[test]
    fn set_clamps_without_snapping() {
        let mut scale = *standard(keys::SERAPHIM_SCALE).unwrap();
        assert_eq!(scale.set(20.0), 20.0);
        assert_eq!(scale.set(500.0), 50.0);
        assert_eq!(scale.set(-1.0), 0.1);
        assert_eq!(scale.set(7.33), 7.33);

        scale.reset();
        assert_eq!(scale.value, 8.0);
    }

    #[test]
    fn snap_rounds_to_whole_steps() {
        let focus = *standard(keys::FOCUS_DISTANCE).unwrap();
        assert!((focus.snap(0.0234) - 0.023).abs() < 1e-6);
        assert_eq!(focus.snap(3.0), 1.0);

        let ambient = *standard(keys::AMBIENT).unwrap();
        assert!((ambient.snap(0.76) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn only_the_seraphim_folder_starts_open() {
        let open: Vec<&str> = STANDARD_GROUPS
            .iter()
            .filter(|g| !g.collapsed)
            .map(|g| g.name)
            .collect();
        assert_eq!(open, vec![SERAPHIM]);
    }
}
