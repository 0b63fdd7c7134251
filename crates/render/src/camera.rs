use glam::{Mat4, Quat, Vec3};
use station_config::CameraSettings;
use station_input::Action;

/// Backbuffer size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Rotates `v` about `axis` by `angle` radians. A zero axis leaves `v` unchanged.
pub fn rotate_about(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle) * v,
        None => v,
    }
}

/// Free-flight camera driven by discrete actions.
///
/// Orientation is the pair (direction, up), rotated incrementally about
/// arbitrary axes; there are no accumulated Euler angles to lock.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    view: Mat4,
    projection: Mat4,
    world: Mat4,
    settings: CameraSettings,
}

impl Camera {
    pub fn new(settings: CameraSettings, viewport: Viewport) -> Self {
        let mut camera = Self {
            position: settings.position,
            direction: settings.direction,
            up: settings.up,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            settings,
        };
        camera.resize(viewport);
        camera.refresh_view();
        camera
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Recomputes the projection for a new backbuffer size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.projection = Mat4::perspective_rh(
            self.settings.fov_degrees.to_radians(),
            viewport.aspect(),
            self.settings.near,
            self.settings.far,
        );
    }

    /// Horizontal axis, `up × direction`. Points to the camera's left.
    pub fn cross(&self) -> Vec3 {
        self.up.cross(self.direction)
    }

    fn step_angle(&self) -> f32 {
        self.settings.angular_step * self.settings.speed
    }

    /// Applies actions in order, then rebuilds the view once.
    pub fn update(&mut self, actions: &[Action]) {
        for action in actions {
            self.apply(*action);
        }
        self.refresh_view();
    }

    fn apply(&mut self, action: Action) {
        let speed = self.settings.speed;
        let angle = self.step_angle();
        let cross = self.cross();
        match action {
            Action::MoveForward => self.position += self.direction * speed,
            Action::MoveBackward => self.position -= self.direction * speed,
            Action::MoveLeft => self.position += cross * speed,
            Action::MoveRight => self.position -= cross * speed,
            Action::MoveUp => self.position += self.up * speed,
            Action::MoveDown => self.position -= self.up * speed,
            Action::YawRight => self.turn_yaw(-angle),
            Action::YawLeft => self.turn_yaw(angle),
            Action::PitchDown => self.turn_pitch(angle),
            Action::PitchUp => self.turn_pitch(-angle),
            Action::RollRight => self.turn_roll(angle),
            Action::RollLeft => self.turn_roll(-angle),
            Action::ResetCamera => self.restore_pose(),
            _ => {}
        }
    }

    fn turn_yaw(&mut self, angle: f32) {
        self.direction = rotate_about(self.direction, self.up, angle);
    }

    fn turn_pitch(&mut self, angle: f32) {
        let cross = self.cross();
        self.direction = rotate_about(self.direction, cross, angle);
        self.up = rotate_about(self.up, cross, angle);
    }

    fn turn_roll(&mut self, angle: f32) {
        self.up = rotate_about(self.up, self.direction, angle);
    }

    fn restore_pose(&mut self) {
        self.position = self.settings.position;
        self.direction = self.settings.direction;
        self.up = self.settings.up;
    }

    /// Rotate direction about up; positive turns left.
    pub fn yaw(&mut self, angle: f32) {
        self.turn_yaw(angle);
        self.refresh_view();
    }

    /// Rotate direction and up about `up × direction`; positive tips the nose down.
    pub fn pitch(&mut self, angle: f32) {
        self.turn_pitch(angle);
        self.refresh_view();
    }

    /// Rotate up about direction; positive rolls right.
    pub fn roll(&mut self, angle: f32) {
        self.turn_roll(angle);
        self.refresh_view();
    }

    pub fn reset(&mut self) {
        self.restore_pose();
        self.refresh_view();
    }

    pub fn refresh_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.position + self.direction, self.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(CameraSettings::default(), Viewport::new(1280, 720))
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn default_camera() {
        let cam = camera();
        assert_eq!(cam.position, Vec3::new(400.0, 90.0, 80.0));
        assert_eq!(cam.world(), Mat4::IDENTITY);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn reset_restores_pose_exactly() {
        let mut cam = camera();
        let (p, d, u) = (cam.position, cam.direction, cam.up);
        let view = cam.view();
        cam.update(&[
            Action::MoveForward,
            Action::YawLeft,
            Action::PitchUp,
            Action::RollRight,
            Action::MoveUp,
        ]);
        cam.update(&[Action::MoveLeft, Action::PitchDown, Action::RollLeft]);
        assert_ne!(cam.position, p);
        cam.update(&[Action::ResetCamera]);
        assert_eq!(cam.position.to_array(), p.to_array());
        assert_eq!(cam.direction.to_array(), d.to_array());
        assert_eq!(cam.up.to_array(), u.to_array());
        assert_eq!(cam.view(), view);
    }

    #[test]
    fn repeated_yaw_matches_single_yaw() {
        let theta = 0.05;
        let mut stepped = camera();
        for _ in 0..20 {
            stepped.yaw(theta);
        }
        let mut once = camera();
        once.yaw(theta * 20.0);
        assert!(close(stepped.direction, once.direction));
        assert!(close(stepped.up, once.up));
    }

    #[test]
    fn yaw_right_turns_toward_positive_x() {
        let settings = CameraSettings {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            ..CameraSettings::default()
        };
        let mut cam = Camera::new(settings, Viewport::new(100, 100));
        cam.update(&[Action::YawRight]);
        assert!(cam.direction.x > 0.0);
        assert!(close(cam.up, Vec3::Y));
    }

    #[test]
    fn pitch_rotates_direction_and_up_together() {
        let settings = CameraSettings {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            ..CameraSettings::default()
        };
        let mut cam = Camera::new(settings, Viewport::new(100, 100));
        cam.update(&[Action::PitchUp]);
        assert!(cam.direction.y > 0.0);
        assert!(cam.direction.dot(cam.up).abs() < 1e-5);
    }

    #[test]
    fn roll_keeps_direction() {
        let mut cam = camera();
        let direction = cam.direction;
        cam.update(&[Action::RollRight, Action::RollRight]);
        assert_eq!(cam.direction, direction);
        assert_ne!(cam.up, Vec3::Y);
    }

    #[test]
    fn strafe_uses_cross_of_up_and_direction() {
        let settings = CameraSettings {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            ..CameraSettings::default()
        };
        let mut cam = Camera::new(settings, Viewport::new(100, 100));
        cam.update(&[Action::MoveLeft]);
        assert!(close(cam.position, Vec3::NEG_X));
    }

    #[test]
    fn degenerate_axis_is_ignored() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(rotate_about(v, Vec3::ZERO, 1.0), v);
    }

    #[test]
    fn resize_changes_projection() {
        let mut cam = camera();
        let before = cam.projection();
        cam.resize(Viewport::new(800, 800));
        assert_ne!(cam.projection(), before);
    }

    #[test]
    fn scene_actions_do_not_move_camera() {
        let mut cam = camera();
        let position = cam.position;
        cam.update(&[Action::ToggleFog, Action::Quit]);
        assert_eq!(cam.position, position);
    }
}
