use crate::action::Action;

/// Ordered set of actions without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `action` at the end unless already present.
    pub fn insert(&mut self, action: Action) -> bool {
        if self.actions.contains(&action) {
            return false;
        }
        self.actions.push(action);
        true
    }

    pub fn remove(&mut self, action: Action) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| *a != action);
        self.actions.len() != before
    }

    pub fn contains(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}

/// This frame's pressed actions alongside last frame's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionFrame {
    pub current: ActionSet,
    pub previous: ActionSet,
}

impl ActionFrame {
    pub fn new(current: ActionSet, previous: ActionSet) -> Self {
        Self { current, previous }
    }

    pub fn held(&self, action: Action) -> bool {
        self.current.contains(action)
    }

    /// Pressed now but not in the previous frame.
    pub fn just_pressed(&self, action: Action) -> bool {
        self.current.contains(action) && !self.previous.contains(action)
    }

    /// Camera actions in press order.
    pub fn camera_actions(&self) -> Vec<Action> {
        self.current.iter().copied().filter(Action::is_camera).collect()
    }
}

/// Tracks held actions between frames.
#[derive(Debug, Default)]
pub struct InputState {
    held: ActionSet,
    previous: ActionSet,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            tracing::trace!("pressed {action}");
        }
    }

    pub fn release(&mut self, action: Action) {
        if self.held.remove(action) {
            tracing::trace!("released {action}");
        }
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn held(&self) -> &ActionSet {
        &self.held
    }

    /// Snapshot for this frame; the snapshot becomes next frame's `previous`.
    pub fn next_frame(&mut self) -> ActionFrame {
        let frame = ActionFrame::new(self.held.clone(), self.previous.clone());
        self.previous = self.held.clone();
        frame
    }
}
