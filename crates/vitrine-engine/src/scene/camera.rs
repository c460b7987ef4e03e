use glam::{Mat4, Vec3};

/// Camera placement for a thumbnail: eye position plus look-at target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    #[inline]
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(PerspectiveCamera::DEFAULT_EYE, Vec3::ZERO)
    }
}

/// Right-handed perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl PerspectiveCamera {
    pub const DEFAULT_FOV_Y_DEGREES: f32 = 50.0;
    pub const DEFAULT_NEAR: f32 = 0.1;
    pub const DEFAULT_FAR: f32 = 1000.0;
    pub const DEFAULT_EYE: Vec3 = Vec3::new(0.0, 2.0, 8.0);

    /// Thumbnail camera: 50° FOV, near 0.1, far 1000, eye (0,2,8) looking at the origin.
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_degrees: Self::DEFAULT_FOV_Y_DEGREES,
            aspect,
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
            position: Self::DEFAULT_EYE,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    #[inline]
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    #[inline]
    pub fn apply_pose(&mut self, pose: CameraPose) {
        self.position = pose.position;
        self.target = pose.target;
    }

    #[inline]
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.target)
    }

    pub fn view(&self) -> Mat4 {
        // look_at_rh degenerates when up is parallel to the view direction.
        let dir = (self.target - self.position).normalize_or_zero();
        let up = if dir.cross(self.up).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            self.up
        };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect.max(f32::EPSILON),
            self.near,
            self.far,
        )
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = PerspectiveCamera::new(1.0);
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn point_behind_camera_has_negative_w() {
        let cam = PerspectiveCamera::new(1.0);
        let clip = cam.view_projection() * Vec3::new(0.0, 2.0, 20.0).extend(1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn straight_down_pose_does_not_produce_nan() {
        let mut cam = PerspectiveCamera::new(1.0);
        cam.apply_pose(CameraPose::new(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO));
        assert!(cam.view_projection().is_finite());
    }
}
