use cgmath::{
    perspective, Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Rad, Vector3,
};
use serde::{Deserialize, Serialize};

/// Minimum angle kept between the view direction and the up vector while orbiting
const POLE_MARGIN: f64 = 0.01;

/// Perspective camera looking at a target point
///
/// The default sits on the +Z axis five units out, looking at the origin.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CameraSpec {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub up: [f64; 3],
    /// Vertical field of view in degrees
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraSpec {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov_deg: 50.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

/// A point projected onto the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// Distance from the eye along the view direction
    pub depth: f64,
    /// Viewport pixels per scene unit at this depth
    pub scale: f32,
}

impl CameraSpec {
    /// Check the values a config file may have gotten wrong
    pub fn validate(&self) -> Result<(), String> {
        let mut values = self
            .position
            .iter()
            .chain(&self.target)
            .chain(&self.up)
            .chain([&self.fov_deg, &self.near, &self.far]);
        if values.any(|v| !v.is_finite()) {
            return Err("camera values must be finite".to_string());
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(format!(
                "camera needs 0 < near < far, got near={} far={}",
                self.near, self.far
            ));
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(format!("camera fov_deg {} is outside (0, 180)", self.fov_deg));
        }
        if self.position == self.target {
            return Err("camera position and target coincide".to_string());
        }
        Ok(())
    }

    pub fn eye(&self) -> Point3<f64> {
        Point3::from(self.position)
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::from(self.target)
    }

    pub fn up_vector(&self) -> Vector3<f64> {
        Vector3::from(self.up)
    }

    pub fn view_matrix(&self) -> Matrix4<f64> {
        Matrix4::look_at_rh(self.eye(), self.center(), self.up_vector())
    }

    pub fn projection_matrix(&self, aspect: f64) -> Matrix4<f64> {
        perspective(Deg(self.fov_deg), aspect, self.near, self.far)
    }

    /// Distance between the eye and the target
    pub fn distance(&self) -> f64 {
        (self.eye() - self.center()).magnitude()
    }

    /// Project a world-space point into a `width` x `height` viewport
    ///
    /// Returns `None` for points behind the camera or outside the near/far range.
    pub fn project(&self, point: Vector3<f64>, width: f32, height: f32) -> Option<ScreenPoint> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let view = self.view_matrix();
        let eye_space = view * Point3::from_vec(point).to_homogeneous();
        let depth = -eye_space.z;
        if depth < self.near || depth > self.far {
            return None;
        }

        let aspect = f64::from(width) / f64::from(height);
        let clip = self.projection_matrix(aspect) * eye_space;
        let ndc = clip.truncate() / clip.w;

        let focal = 1.0 / (Rad::from(Deg(self.fov_deg)).0 / 2.0).tan();
        Some(ScreenPoint {
            x: ((ndc.x + 1.0) * 0.5 * f64::from(width)) as f32,
            y: ((1.0 - ndc.y) * 0.5 * f64::from(height)) as f32,
            depth,
            scale: (focal * 0.5 * f64::from(height) / depth) as f32,
        })
    }

    /// Rotate the eye around the target
    ///
    /// `yaw` turns around the up axis, `pitch` tilts toward or away from it (radians).
    pub fn orbit(&mut self, yaw: f64, pitch: f64) {
        let up = self.up_vector().normalize();
        let offset = self.eye() - self.center();
        let radius = offset.magnitude();
        if radius == 0.0 {
            return;
        }

        let mut offset = Matrix3::from_axis_angle(up, Rad(yaw)) * offset;

        let right = offset.cross(up);
        if right.magnitude2() > 0.0 {
            let polar = offset.angle(up).0;
            let new_polar = (polar - pitch).clamp(POLE_MARGIN, std::f64::consts::PI - POLE_MARGIN);
            offset = Matrix3::from_axis_angle(right.normalize(), Rad(polar - new_polar)) * offset;
        }

        let offset = offset.normalize_to(radius);
        self.position = (self.center() + offset).into();
    }

    /// Move the eye toward (`factor < 1`) or away from (`factor > 1`) the target
    pub fn zoom(&mut self, factor: f64) {
        let offset = self.eye() - self.center();
        if offset.magnitude2() == 0.0 {
            return;
        }
        // Bounds may cross for a tight near/far pair; the near bound wins
        let min = self.near * 2.0;
        let max = self.far / 2.0;
        let radius = (offset.magnitude() * factor).min(max).max(min);
        self.position = (self.center() + offset.normalize_to(radius)).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_with_tight_clip_range() {
        let mut camera = CameraSpec {
            position: [0.0, 0.0, 20.0],
            near: 10.0,
            far: 30.0,
            ..Default::default()
        };
        camera.zoom(0.9);
        assert!(camera.position.iter().all(|v| v.is_finite()));
        assert_close(camera.distance(), 20.0);

        camera.zoom(2.0);
        assert_close(camera.distance(), 20.0);
    }

    #[test]
    fn test_validate() {
        assert!(CameraSpec::default().validate().is_ok());

        let tight = CameraSpec {
            near: 10.0,
            far: 30.0,
            ..Default::default()
        };
        assert!(tight.validate().is_ok());

        let inverted = CameraSpec {
            near: 5.0,
            far: 1.0,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let nan = CameraSpec {
            fov_deg: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        let degenerate = CameraSpec {
            position: [0.0; 3],
            ..Default::default()
        };
        assert!(degenerate.validate().is_err());
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_origin_projects_to_viewport_center() {
        let camera = CameraSpec::default();
        let p = camera.project(Vector3::new(0.0, 0.0, 0.0), 800.0, 600.0).unwrap();

        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);
        assert_close(p.depth, 5.0);
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = CameraSpec::default();
        let p = camera.project(Vector3::new(0.0, 1.0, 0.0), 800.0, 600.0).unwrap();
        assert!(p.y < 300.0);

        let p = camera.project(Vector3::new(1.0, 0.0, 0.0), 800.0, 600.0).unwrap();
        assert!(p.x > 400.0);
    }

    #[test]
    fn test_point_behind_camera_is_hidden() {
        let camera = CameraSpec::default();
        assert!(camera.project(Vector3::new(0.0, 0.0, 6.0), 800.0, 600.0).is_none());
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = CameraSpec::default();
        camera.orbit(0.7, 0.3);
        assert_close(camera.distance(), 5.0);

        camera.orbit(-2.0, 10.0);
        assert_close(camera.distance(), 5.0);
        // Pitch is clamped short of the pole
        let offset = camera.eye() - camera.center();
        assert!(offset.angle(camera.up_vector()).0 >= POLE_MARGIN - 1e-9);
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let mut camera = CameraSpec::default();
        camera.orbit(std::f64::consts::FRAC_PI_2, 0.0);
        assert_close(camera.position[0], 5.0);
        assert_close(camera.position[1], 0.0);
        assert_close(camera.position[2], 0.0);
    }

    #[test]
    fn test_zoom() {
        let mut camera = CameraSpec::default();
        camera.zoom(0.5);
        assert_close(camera.distance(), 2.5);
        camera.zoom(1e9);
        assert_close(camera.distance(), camera.far / 2.0);
    }
}
