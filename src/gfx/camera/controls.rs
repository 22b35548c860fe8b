//! Orbit controls
//!
//! Drag rotates, shift+drag pans, wheel zooms, shift+C resets. Raw device
//! events are first turned into a [`ControlAction`] so the camera math can
//! be driven and tested without a window.

use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::orbit_camera::OrbitCamera;

/// Pixels of touchpad scroll counted as one wheel line
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Pointer motion in pixels while dragging
    Orbit { dx: f32, dy: f32 },
    Pan { dx: f32, dy: f32 },
    /// Wheel lines; positive zooms in
    Zoom(f32),
    Reset,
}

pub struct OrbitControls {
    pub camera: OrbitCamera,
    /// Radians per pixel
    pub rotate_speed: f32,
    /// Fraction of the distance per wheel line
    pub zoom_speed: f32,
    /// Fraction of the distance per pixel
    pub pan_speed: f32,
    dragging: bool,
    shift_held: bool,
    input_blocked: bool,
}

impl OrbitControls {
    pub fn new(camera: OrbitCamera) -> Self {
        Self {
            camera,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
            dragging: false,
            shift_held: false,
            input_blocked: false,
        }
    }

    /// While blocked, new drags and wheel input are ignored
    pub fn set_input_blocked(&mut self, blocked: bool) {
        self.input_blocked = blocked;
    }

    pub fn device_event(&mut self, event: &DeviceEvent) {
        if let Some(action) = self.interpret_device(event) {
            self.apply(action);
        }
    }

    pub fn keyboard_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if let Some(action) = self.interpret_key(code, event.state) {
            self.apply(action);
        }
    }

    fn interpret_device(&mut self, event: &DeviceEvent) -> Option<ControlAction> {
        match event {
            // Left mouse button
            DeviceEvent::Button { button: 0, state } => {
                // A drag that starts over the panel belongs to the panel
                self.dragging = *state == ElementState::Pressed && !self.input_blocked;
                None
            }
            DeviceEvent::MouseWheel { delta } if !self.input_blocked => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                        *y as f32 / PIXELS_PER_LINE
                    }
                };
                Some(ControlAction::Zoom(lines))
            }
            DeviceEvent::MouseMotion { delta: (dx, dy) } if self.dragging => {
                let (dx, dy) = (*dx as f32, *dy as f32);
                Some(if self.shift_held {
                    ControlAction::Pan { dx, dy }
                } else {
                    ControlAction::Orbit { dx, dy }
                })
            }
            _ => None,
        }
    }

    fn interpret_key(&mut self, code: KeyCode, state: ElementState) -> Option<ControlAction> {
        match code {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => {
                self.shift_held = state == ElementState::Pressed;
                None
            }
            KeyCode::KeyC if self.shift_held && state == ElementState::Pressed => {
                Some(ControlAction::Reset)
            }
            _ => None,
        }
    }

    pub fn apply(&mut self, action: ControlAction) {
        match action {
            ControlAction::Orbit { dx, dy } => self
                .camera
                .orbit(-dx * self.rotate_speed, -dy * self.rotate_speed),
            ControlAction::Pan { dx, dy } => self
                .camera
                .pan(-dx * self.pan_speed, dy * self.pan_speed),
            ControlAction::Zoom(lines) => self.camera.dolly((1.0 - self.zoom_speed).powf(lines)),
            ControlAction::Reset => {
                log::debug!("resetting camera to its initial view");
                self.camera.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3, Zero};

    fn controls() -> OrbitControls {
        OrbitControls::new(OrbitCamera::looking_at(
            Vector3::new(0.0, 2.0, 8.0),
            Vector3::zero(),
            1.5,
        ))
    }

    fn press(controls: &mut OrbitControls) {
        controls.device_event(&DeviceEvent::Button {
            button: 0,
            state: ElementState::Pressed,
        });
    }

    fn motion(controls: &mut OrbitControls, dx: f64, dy: f64) {
        controls.device_event(&DeviceEvent::MouseMotion { delta: (dx, dy) });
    }

    #[test]
    fn motion_without_drag_does_nothing() {
        let mut controls = controls();
        let eye = controls.camera.eye();
        motion(&mut controls, 50.0, 20.0);
        assert_eq!(controls.camera.eye(), eye);
    }

    #[test]
    fn drag_orbits_around_the_target() {
        let mut controls = controls();
        let eye = controls.camera.eye();
        press(&mut controls);
        motion(&mut controls, 100.0, 0.0);

        assert!((controls.camera.eye() - eye).magnitude() > 0.1);
        assert!((controls.camera.radius() - eye.magnitude()).abs() < 1e-3);
    }

    #[test]
    fn shift_drag_pans() {
        let mut controls = controls();
        controls.shift_held = true;
        press(&mut controls);
        motion(&mut controls, 100.0, 0.0);

        assert!(controls.camera.target().magnitude() > 0.1);
    }

    #[test]
    fn blocked_input_ignores_new_drags_and_wheel() {
        let mut controls = controls();
        controls.set_input_blocked(true);
        let eye = controls.camera.eye();

        press(&mut controls);
        motion(&mut controls, 100.0, 0.0);
        controls.device_event(&DeviceEvent::MouseWheel {
            delta: MouseScrollDelta::LineDelta(0.0, 3.0),
        });
        assert_eq!(controls.camera.eye(), eye);
    }

    #[test]
    fn wheel_up_zooms_in() {
        let mut controls = controls();
        let radius = controls.camera.radius();
        controls.device_event(&DeviceEvent::MouseWheel {
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
        });
        assert!(controls.camera.radius() < radius);
    }

    #[test]
    fn shift_c_resets() {
        let mut controls = controls();
        let eye = controls.camera.eye();
        controls.apply(ControlAction::Orbit { dx: 80.0, dy: 30.0 });

        assert_eq!(controls.interpret_key(KeyCode::KeyC, ElementState::Pressed), None);
        controls.interpret_key(KeyCode::ShiftLeft, ElementState::Pressed);
        let action = controls.interpret_key(KeyCode::KeyC, ElementState::Pressed);
        assert_eq!(action, Some(ControlAction::Reset));

        controls.apply(ControlAction::Reset);
        assert!((controls.camera.eye() - eye).magnitude() < 1e-4);
    }
}
