use cgmath::*;

use crate::scene::CameraRig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// How far the orbit may stray. Polar angles are measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_radius: 0.5,
            max_radius: 200.0,
            min_polar: 0.01,
            max_polar: std::f32::consts::PI - 0.01,
        }
    }
}

/// Spherical coordinates of the eye around the target
#[derive(Debug, Clone, Copy, PartialEq)]
struct Orbit {
    target: Vector3<f32>,
    radius: f32,
    polar: f32,
    azimuth: f32,
}

impl Orbit {
    fn from_eye(eye: Vector3<f32>, target: Vector3<f32>) -> Self {
        let offset = eye - target;
        let radius = offset.magnitude();
        if radius <= f32::EPSILON {
            return Self {
                target,
                radius: 1.0,
                polar: std::f32::consts::FRAC_PI_2,
                azimuth: 0.0,
            };
        }
        Self {
            target,
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    fn eye(&self) -> Vector3<f32> {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target
            + Vector3::new(
                sin_polar * sin_azimuth,
                cos_polar,
                sin_polar * cos_azimuth,
            ) * self.radius
    }
}

/// Free orbit camera around a target point, Y up.
///
/// Remembers where it was created so a reset returns there.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    orbit: Orbit,
    home: Orbit,
    pub limits: OrbitLimits,
    pub up: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    /// Camera placed at `eye` looking at `target`
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let orbit = Orbit::from_eye(eye, target);
        Self {
            orbit,
            home: orbit,
            limits: OrbitLimits::default(),
            up: Vector3::unit_y(),
            fovy: Rad(std::f32::consts::FRAC_PI_4),
            aspect,
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Camera at the rig's initial position and field of view
    pub fn from_rig(rig: &CameraRig, aspect: f32) -> Self {
        Self::looking_at(rig.position.into(), rig.target.into(), aspect)
            .with_fov(Deg(rig.fov_degrees))
    }

    pub fn with_fov(mut self, fovy: impl Into<Rad<f32>>) -> Self {
        self.fovy = fovy.into();
        self
    }

    pub fn eye(&self) -> Vector3<f32> {
        self.orbit.eye()
    }

    pub fn target(&self) -> Vector3<f32> {
        self.orbit.target
    }

    pub fn radius(&self) -> f32 {
        self.orbit.radius
    }

    /// Rotates around the target; polar motion stops short of the poles
    pub fn orbit(&mut self, d_azimuth: f32, d_polar: f32) {
        self.orbit.azimuth += d_azimuth;
        self.orbit.polar =
            (self.orbit.polar + d_polar).clamp(self.limits.min_polar, self.limits.max_polar);
    }

    /// Scales the distance to the target; factors below 1 move closer
    pub fn dolly(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.orbit.radius =
            (self.orbit.radius * factor).clamp(self.limits.min_radius, self.limits.max_radius);
    }

    /// Slides eye and target together across the view plane.
    /// Movement scales with the distance so panning feels the same at any zoom.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.orbit.target - self.eye()).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);
        self.orbit.target += (right * dx + up * dy) * self.orbit.radius;
    }

    pub fn reset(&mut self) {
        self.orbit = self.home;
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye()),
            Point3::from_vec(self.orbit.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < 1e-4, "{:?} != {:?}", a, b);
    }

    #[test]
    fn rig_places_the_eye() {
        let camera = OrbitCamera::from_rig(&CameraRig::default(), 1.5);
        assert_close(camera.eye(), Vector3::new(0.0, 2.0, 8.0));
        assert_close(camera.target(), Vector3::zero());
        assert!((Deg::from(camera.fovy).0 - 50.0).abs() < 1e-4);
    }

    #[test]
    fn reset_returns_home_after_orbit_and_pan() {
        let mut camera =
            OrbitCamera::looking_at(Vector3::new(0.0, 2.0, 8.0), Vector3::zero(), 1.5);
        camera.orbit(1.0, 0.3);
        camera.pan(0.5, -0.2);
        camera.dolly(2.0);

        camera.reset();
        assert_close(camera.eye(), Vector3::new(0.0, 2.0, 8.0));
        assert_close(camera.target(), Vector3::zero());
    }

    #[test]
    fn orbit_keeps_distance_and_stops_at_the_pole() {
        let mut camera =
            OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 10.0), Vector3::zero(), 1.0);
        camera.orbit(0.7, -10.0);

        assert!((camera.eye().magnitude() - 10.0).abs() < 1e-3);
        assert!(camera.eye().y < 10.0);
        assert!(camera.eye().y > 9.9);
    }

    #[test]
    fn dolly_respects_limits() {
        let mut camera =
            OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 10.0), Vector3::zero(), 1.0);
        camera.dolly(1000.0);
        assert_eq!(camera.radius(), 200.0);
        camera.dolly(1e-6);
        assert_eq!(camera.radius(), 0.5);
        camera.dolly(-1.0);
        assert_eq!(camera.radius(), 0.5);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let mut camera =
            OrbitCamera::looking_at(Vector3::new(0.0, 0.0, 10.0), Vector3::zero(), 1.0);
        camera.pan(0.1, 0.0);

        assert_close(camera.target(), Vector3::new(1.0, 0.0, 0.0));
        assert_close(camera.eye(), Vector3::new(1.0, 0.0, 10.0));
    }
}
