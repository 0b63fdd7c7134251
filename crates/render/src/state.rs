use crate::host::{FilterLevel, FilterSet};
use crate::lighting::LightRig;
use station_config::FogSettings;
use station_input::{Action, ActionFrame};
use tracing::{debug, info};

/// Fog distance change per frame while an adjust action is held.
pub const FOG_STEP: f32 = 5.0;
/// Clipping plane change per frame while held.
pub const CLIP_STEP: f32 = 1.0;
pub const LOD_BIAS_STEP: f32 = 0.1;
/// Starting mip bias; strongly favours the sharpest level.
pub const DEFAULT_LOD_BIAS: f32 = -10.0;

/// Runtime-mutable scene settings, owned by the session and changed only by input.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub fog: FogSettings,
    pub wireframe: bool,
    pub filters: FilterSet,
    pub lights: LightRig,
    /// View-space depth of the clipping plane; 0 clips nothing in front of the camera.
    pub clip_plane: f32,
    pub lod_bias: f32,
    pub multisample: bool,
    /// Platform shows its alternate base texture.
    pub platform_alternate: bool,
    pub quit_requested: bool,
}

impl SceneState {
    pub fn new(fog: FogSettings, lights: LightRig) -> Self {
        Self {
            fog,
            wireframe: false,
            filters: FilterSet::default(),
            lights,
            clip_plane: 0.0,
            lod_bias: DEFAULT_LOD_BIAS,
            multisample: false,
            platform_alternate: false,
            quit_requested: false,
        }
    }

    /// Applies the non-camera actions of one frame.
    ///
    /// Returns `true` when the platform texture variant changed.
    pub fn apply(&mut self, frame: &ActionFrame) -> bool {
        let mut platform_swapped = false;
        for &action in frame.current.iter() {
            if action.is_camera() {
                continue;
            }
            if action.is_edge_triggered() && !frame.just_pressed(action) {
                continue;
            }
            match action {
                Action::ToggleWireframe => {
                    self.wireframe = !self.wireframe;
                    debug!(wireframe = self.wireframe, "wireframe toggled");
                }
                Action::ToggleLight(index) => {
                    self.lights.toggle(index as usize);
                }
                Action::ClipPlaneIncrease => self.clip_plane += CLIP_STEP,
                Action::ClipPlaneDecrease => self.clip_plane -= CLIP_STEP,
                Action::ToggleFog => {
                    self.fog.enabled = !self.fog.enabled;
                    debug!(enabled = self.fog.enabled, "fog toggled");
                }
                Action::FogStartIncrease => self.fog.start += FOG_STEP,
                Action::FogStartDecrease => self.fog.start -= FOG_STEP,
                Action::FogEndIncrease => self.fog.end += FOG_STEP,
                Action::FogEndDecrease => self.fog.end -= FOG_STEP,
                Action::CycleMinFilter => self.filters.min = self.filters.min.next(),
                Action::CycleMagFilter => self.filters.mag = self.filters.mag.next(),
                Action::CycleMipFilter => self.filters.mip = self.filters.mip.next(),
                Action::FiltersPoint => self.filters = FilterSet::uniform(FilterLevel::Point),
                Action::FiltersLinear => self.filters = FilterSet::uniform(FilterLevel::Linear),
                Action::FiltersAnisotropic => {
                    self.filters = FilterSet::uniform(FilterLevel::Anisotropic)
                }
                Action::LodBiasIncrease => self.lod_bias += LOD_BIAS_STEP,
                Action::LodBiasDecrease => self.lod_bias -= LOD_BIAS_STEP,
                Action::ToggleMultisampling => {
                    self.multisample = !self.multisample;
                    debug!(multisample = self.multisample, "multisampling toggled");
                }
                Action::SwapPlatformTexture => {
                    self.platform_alternate = !self.platform_alternate;
                    platform_swapped = true;
                }
                Action::Quit => {
                    info!("quit requested");
                    self.quit_requested = true;
                }
                _ => {}
            }
        }
        platform_swapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use station_input::ActionSet;

    fn frame(current: &[Action], previous: &[Action]) -> ActionFrame {
        ActionFrame::new(
            current.iter().copied().collect(),
            previous.iter().copied().collect::<ActionSet>(),
        )
    }

    fn state() -> SceneState {
        SceneState::new(FogSettings::default(), LightRig::station())
    }

    #[test]
    fn toggles_act_once_per_press() {
        let mut s = state();
        s.apply(&frame(&[Action::ToggleFog, Action::ToggleWireframe], &[]));
        assert!(s.fog.enabled);
        assert!(s.wireframe);

        // Still held on the next frame: no change.
        s.apply(&frame(
            &[Action::ToggleFog, Action::ToggleWireframe],
            &[Action::ToggleFog, Action::ToggleWireframe],
        ));
        assert!(s.fog.enabled);
        assert!(s.wireframe);
    }

    #[test]
    fn fog_adjusts_every_held_frame() {
        let mut s = state();
        let held = [Action::FogStartIncrease, Action::FogEndDecrease];
        s.apply(&frame(&held, &[]));
        s.apply(&frame(&held, &held));
        assert_eq!(s.fog.start, 110.0);
        assert_eq!(s.fog.end, 990.0);
    }

    #[test]
    fn filters_cycle_and_reset() {
        let mut s = state();
        s.apply(&frame(&[Action::CycleMinFilter], &[]));
        assert_eq!(s.filters.min, FilterLevel::Point);
        assert_eq!(s.filters.mag, FilterLevel::Anisotropic);
        s.apply(&frame(&[Action::FiltersLinear], &[]));
        assert_eq!(s.filters, FilterSet::uniform(FilterLevel::Linear));
    }

    #[test]
    fn clip_plane_and_lod_bias_move_while_held() {
        let mut s = state();
        assert_eq!(s.clip_plane, 0.0);
        assert_eq!(s.lod_bias, DEFAULT_LOD_BIAS);

        let held = [Action::ClipPlaneIncrease, Action::LodBiasIncrease];
        for _ in 0..3 {
            s.apply(&frame(&held, &held));
        }
        assert_eq!(s.clip_plane, 3.0);
        assert!((s.lod_bias - (DEFAULT_LOD_BIAS + 0.3)).abs() < 1e-4);

        s.apply(&frame(&[Action::ClipPlaneDecrease, Action::LodBiasDecrease], &[]));
        assert_eq!(s.clip_plane, 2.0);
        assert!((s.lod_bias - (DEFAULT_LOD_BIAS + 0.2)).abs() < 1e-4);
    }

    #[test]
    fn multisampling_toggles_on_press() {
        let mut s = state();
        assert!(!s.multisample);
        s.apply(&frame(&[Action::ToggleMultisampling], &[]));
        assert!(s.multisample);
        s.apply(&frame(&[Action::ToggleMultisampling], &[Action::ToggleMultisampling]));
        assert!(s.multisample);
        s.apply(&frame(&[], &[Action::ToggleMultisampling]));
        s.apply(&frame(&[Action::ToggleMultisampling], &[]));
        assert!(!s.multisample);
    }

    #[test]
    fn light_toggle_and_platform_swap() {
        let mut s = state();
        assert!(!s.apply(&frame(&[Action::ToggleLight(3)], &[])));
        assert!(!s.lights.lights[3].enabled);
        assert!(s.apply(&frame(&[Action::SwapPlatformTexture], &[])));
        assert!(s.platform_alternate);
    }

    #[test]
    fn camera_actions_leave_state_alone() {
        let mut s = state();
        s.apply(&frame(&[Action::MoveForward, Action::YawLeft], &[]));
        assert_eq!(s, state());
        s.apply(&frame(&[Action::Quit], &[]));
        assert!(s.quit_requested);
    }
}
