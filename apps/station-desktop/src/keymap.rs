use station_input::Action;
use winit::keyboard::KeyCode;

/// Key bound to each action. F1 is handled by the window itself.
pub const BINDINGS: &[(KeyCode, Action)] = &[
    (KeyCode::ArrowUp, Action::MoveForward),
    (KeyCode::ArrowDown, Action::MoveBackward),
    (KeyCode::ArrowLeft, Action::MoveLeft),
    (KeyCode::ArrowRight, Action::MoveRight),
    (KeyCode::KeyZ, Action::MoveUp),
    (KeyCode::KeyX, Action::MoveDown),
    (KeyCode::KeyA, Action::YawLeft),
    (KeyCode::KeyD, Action::YawRight),
    (KeyCode::KeyW, Action::PitchUp),
    (KeyCode::KeyS, Action::PitchDown),
    (KeyCode::KeyQ, Action::RollLeft),
    (KeyCode::KeyE, Action::RollRight),
    (KeyCode::KeyR, Action::ResetCamera),
    (KeyCode::KeyC, Action::ToggleWireframe),
    (KeyCode::Digit1, Action::ToggleLight(0)),
    (KeyCode::Digit2, Action::ToggleLight(1)),
    (KeyCode::Digit3, Action::ToggleLight(2)),
    (KeyCode::Digit4, Action::ToggleLight(3)),
    (KeyCode::Digit5, Action::ClipPlaneIncrease),
    (KeyCode::Digit6, Action::ClipPlaneDecrease),
    (KeyCode::KeyF, Action::ToggleFog),
    (KeyCode::KeyG, Action::FogStartIncrease),
    (KeyCode::KeyH, Action::FogStartDecrease),
    (KeyCode::KeyB, Action::FogEndIncrease),
    (KeyCode::KeyN, Action::FogEndDecrease),
    (KeyCode::NumpadMultiply, Action::CycleMinFilter),
    (KeyCode::BracketLeft, Action::CycleMagFilter),
    (KeyCode::BracketRight, Action::CycleMipFilter),
    (KeyCode::Digit8, Action::FiltersPoint),
    (KeyCode::Digit9, Action::FiltersLinear),
    (KeyCode::Digit0, Action::FiltersAnisotropic),
    (KeyCode::KeyU, Action::LodBiasDecrease),
    (KeyCode::KeyI, Action::LodBiasIncrease),
    (KeyCode::KeyM, Action::ToggleMultisampling),
    (KeyCode::KeyT, Action::SwapPlatformTexture),
    (KeyCode::Escape, Action::Quit),
];

pub fn action_for(key: KeyCode) -> Option<Action> {
    BINDINGS
        .iter()
        .find(|(bound, _)| *bound == key)
        .map(|(_, action)| *action)
}

pub fn key_for(action: Action) -> Option<KeyCode> {
    BINDINGS
        .iter()
        .find(|(_, bound)| *bound == action)
        .map(|(key, _)| *key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_binds_once() {
        for (i, (key, _)) in BINDINGS.iter().enumerate() {
            assert!(
                BINDINGS[i + 1..].iter().all(|(other, _)| other != key),
                "{key:?} bound twice"
            );
        }
    }

    #[test]
    fn lights_are_numbered_from_one() {
        assert_eq!(action_for(KeyCode::Digit1), Some(Action::ToggleLight(0)));
        assert_eq!(key_for(Action::ToggleLight(3)), Some(KeyCode::Digit4));
    }

    #[test]
    fn texture_and_clip_keys() {
        assert_eq!(action_for(KeyCode::Digit5), Some(Action::ClipPlaneIncrease));
        assert_eq!(action_for(KeyCode::KeyU), Some(Action::LodBiasDecrease));
        assert_eq!(key_for(Action::ToggleMultisampling), Some(KeyCode::KeyM));
    }

    #[test]
    fn unbound_keys_map_to_nothing() {
        assert_eq!(action_for(KeyCode::F1), None);
        assert_eq!(action_for(KeyCode::KeyP), None);
    }
}
