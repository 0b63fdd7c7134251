use std::fmt;
use std::str::FromStr;

/// A discrete action produced by the host's key mapping.
///
/// Camera actions and held adjustments act every frame while pressed. Toggles,
/// filter changes and quit act only on the frame they become pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    YawLeft,
    YawRight,
    PitchUp,
    PitchDown,
    RollLeft,
    RollRight,
    ResetCamera,
    ToggleWireframe,
    /// Zero-based light index.
    ToggleLight(u8),
    /// Pushes the clipping plane one unit further from the camera.
    ClipPlaneIncrease,
    ClipPlaneDecrease,
    ToggleFog,
    FogStartIncrease,
    FogStartDecrease,
    FogEndIncrease,
    FogEndDecrease,
    CycleMinFilter,
    CycleMagFilter,
    CycleMipFilter,
    FiltersPoint,
    FiltersLinear,
    FiltersAnisotropic,
    LodBiasIncrease,
    LodBiasDecrease,
    ToggleMultisampling,
    SwapPlatformTexture,
    Quit,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown action: {0}")]
pub struct ParseActionError(pub String);

const NAMED: &[(&str, Action)] = &[
    ("move-forward", Action::MoveForward),
    ("move-backward", Action::MoveBackward),
    ("move-left", Action::MoveLeft),
    ("move-right", Action::MoveRight),
    ("move-up", Action::MoveUp),
    ("move-down", Action::MoveDown),
    ("yaw-left", Action::YawLeft),
    ("yaw-right", Action::YawRight),
    ("pitch-up", Action::PitchUp),
    ("pitch-down", Action::PitchDown),
    ("roll-left", Action::RollLeft),
    ("roll-right", Action::RollRight),
    ("reset-camera", Action::ResetCamera),
    ("toggle-wireframe", Action::ToggleWireframe),
    ("clip-plane-increase", Action::ClipPlaneIncrease),
    ("clip-plane-decrease", Action::ClipPlaneDecrease),
    ("toggle-fog", Action::ToggleFog),
    ("fog-start-increase", Action::FogStartIncrease),
    ("fog-start-decrease", Action::FogStartDecrease),
    ("fog-end-increase", Action::FogEndIncrease),
    ("fog-end-decrease", Action::FogEndDecrease),
    ("cycle-min-filter", Action::CycleMinFilter),
    ("cycle-mag-filter", Action::CycleMagFilter),
    ("cycle-mip-filter", Action::CycleMipFilter),
    ("filters-point", Action::FiltersPoint),
    ("filters-linear", Action::FiltersLinear),
    ("filters-anisotropic", Action::FiltersAnisotropic),
    ("lod-bias-increase", Action::LodBiasIncrease),
    ("lod-bias-decrease", Action::LodBiasDecrease),
    ("toggle-multisampling", Action::ToggleMultisampling),
    ("swap-platform-texture", Action::SwapPlatformTexture),
    ("quit", Action::Quit),
];

impl Action {
    /// Handled by the camera controller.
    pub fn is_camera(&self) -> bool {
        matches!(
            self,
            Action::MoveForward
                | Action::MoveBackward
                | Action::MoveLeft
                | Action::MoveRight
                | Action::MoveUp
                | Action::MoveDown
                | Action::YawLeft
                | Action::YawRight
                | Action::PitchUp
                | Action::PitchDown
                | Action::RollLeft
                | Action::RollRight
                | Action::ResetCamera
        )
    }

    /// Acts only on the frame the action becomes pressed.
    pub fn is_edge_triggered(&self) -> bool {
        !self.is_camera()
            && !matches!(
                self,
                Action::FogStartIncrease
                    | Action::FogStartDecrease
                    | Action::FogEndIncrease
                    | Action::FogEndDecrease
                    | Action::ClipPlaneIncrease
                    | Action::ClipPlaneDecrease
                    | Action::LodBiasIncrease
                    | Action::LodBiasDecrease
            )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Action::ToggleLight(index) = self {
            return write!(f, "toggle-light-{}", u16::from(*index) + 1);
        }
        let name = NAMED
            .iter()
            .find(|(_, action)| action == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown");
        f.write_str(name)
    }
}

impl FromStr for Action {
    type Err = ParseActionError;

    /// Parses kebab-case names; lights are numbered from one (`toggle-light-1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(number) = s.strip_prefix("toggle-light-") {
            return match number.parse::<u8>() {
                Ok(n) if n >= 1 => Ok(Action::ToggleLight(n - 1)),
                _ => Err(ParseActionError(s.to_string())),
            };
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, action)| *action)
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_actions_are_held() {
        assert!(Action::YawLeft.is_camera());
        assert!(!Action::YawLeft.is_edge_triggered());
        assert!(!Action::FogEndIncrease.is_camera());
        assert!(!Action::FogEndIncrease.is_edge_triggered());
        assert!(!Action::ClipPlaneDecrease.is_edge_triggered());
        assert!(!Action::LodBiasIncrease.is_edge_triggered());
    }

    #[test]
    fn toggles_are_edge_triggered() {
        assert!(Action::ToggleFog.is_edge_triggered());
        assert!(Action::ToggleLight(2).is_edge_triggered());
        assert!(Action::CycleMipFilter.is_edge_triggered());
        assert!(Action::ToggleMultisampling.is_edge_triggered());
        assert!(Action::Quit.is_edge_triggered());
    }

    #[test]
    fn names_parse_back() {
        for (name, action) in NAMED {
            assert_eq!(name.parse::<Action>().unwrap(), *action);
            assert_eq!(action.to_string(), *name);
        }
        assert_eq!("toggle-light-3".parse::<Action>().unwrap(), Action::ToggleLight(2));
        assert_eq!(Action::ToggleLight(0).to_string(), "toggle-light-1");
    }

    #[test]
    fn highest_light_index_formats() {
        assert_eq!(Action::ToggleLight(u8::MAX).to_string(), "toggle-light-256");
    }

    #[test]
    fn unknown_names_fail() {
        assert!("fly".parse::<Action>().is_err());
        assert!("toggle-light-0".parse::<Action>().is_err());
    }
}
