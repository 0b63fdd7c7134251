//! Input: raw keys are mapped to discrete [`Action`]s by the host; the core only
//! ever sees actions.
//!
//! # Invariants
//! - A frame's pressed set is de-duplicated and keeps press order.
//! - Edge-triggered actions fire once per press; held actions fire every frame.

pub mod action;
mod frame;

pub use action::{Action, ParseActionError};
pub use frame::{ActionFrame, ActionSet, InputState};

pub fn crate_info() -> &'static str {
    "station-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
