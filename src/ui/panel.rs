//! Parameter panel
//!
//! One collapsing header per parameter group and one slider per parameter.
//! The window starts collapsed.

use imgui::{Condition, TreeNodeFlags};

use crate::params::{ControlParameter, ParameterSet};

pub struct ParameterPanel {
    title: String,
}

impl ParameterPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Draws the panel and writes slider changes into `params`.
    /// Returns true when any value changed.
    pub fn draw(&self, ui: &imgui::Ui, params: &mut ParameterSet) -> bool {
        let display_size = ui.io().display_size;
        if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
            return false;
        }

        let groups = params.groups().to_vec();
        ui.window(&self.title)
            .collapsed(true, Condition::FirstUseEver)
            .position([display_size[0] - 340.0, 10.0], Condition::FirstUseEver)
            .size([330.0, 420.0], Condition::FirstUseEver)
            .build(|| {
                let mut changed = false;
                for group in &groups {
                    let flags = if group.collapsed {
                        TreeNodeFlags::empty()
                    } else {
                        TreeNodeFlags::DEFAULT_OPEN
                    };
                    if !ui.collapsing_header(group.name, flags) {
                        continue;
                    }
                    for parameter in params
                        .parameters_mut()
                        .iter_mut()
                        .filter(|p| p.group == group.name)
                    {
                        changed |= slider(ui, parameter);
                    }
                }

                ui.separator();
                if ui.button("Reset") {
                    params.reset();
                    changed = true;
                }
                changed
            })
            .unwrap_or(false)
    }
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self::new("Controls")
    }
}

fn slider(ui: &imgui::Ui, parameter: &mut ControlParameter) -> bool {
    let mut value = parameter.value;
    let label = format!("{}##{}", parameter.label, parameter.key);
    if !ui
        .slider_config(&label, parameter.min, parameter.max)
        .display_format("%.3f")
        .build(&mut value)
    {
        return false;
    }
    apply_slider(parameter, value)
}

/// Stores a slider value snapped to the parameter's step; true if it changed
pub fn apply_slider(parameter: &mut ControlParameter, raw: f32) -> bool {
    if !raw.is_finite() {
        return false;
    }
    let previous = parameter.value;
    parameter.set(parameter.snap(raw)) != previous
}
