#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ToggleRun,
    Attack,
    Quit,
}

const ACTION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::ToggleRun,
        InputAction::Attack,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::ToggleRun => 4,
            InputAction::Attack => 5,
            InputAction::Quit => 6,
        }
    }
}

/// Per-frame view of the input source: which actions are held, and which
/// went down on this frame only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    held: ActionStates,
    pressed: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.held.is_down(action)
    }

    pub fn is_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn quit_requested(&self) -> bool {
        self.is_pressed(InputAction::Quit)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.held.set(action, is_down);
        self
    }

    /// Marks `action` as pressed this frame. A press is always also held.
    pub fn with_action_pressed(mut self, action: InputAction, is_pressed: bool) -> Self {
        self.pressed.set(action, is_pressed);
        if is_pressed {
            self.held.set(action, true);
        }
        self
    }
}

/// Derives edge-triggered presses from consecutive raw held states.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: ActionStates,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, held_now: &[InputAction]) -> InputSnapshot {
        let mut held = ActionStates::default();
        for action in held_now {
            held.set(*action, true);
        }
        let mut pressed = ActionStates::default();
        for action in InputAction::ALL {
            pressed.set(action, held.is_down(action) && !self.previous.is_down(action));
        }
        self.previous = held;
        InputSnapshot { held, pressed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_reports_press_only_on_transition_frame() {
        let mut tracker = InputTracker::new();
        let first = tracker.advance(&[InputAction::Attack]);
        assert!(first.is_pressed(InputAction::Attack));
        assert!(first.is_down(InputAction::Attack));

        let second = tracker.advance(&[InputAction::Attack]);
        assert!(!second.is_pressed(InputAction::Attack));
        assert!(second.is_down(InputAction::Attack));

        let released = tracker.advance(&[]);
        assert!(!released.is_down(InputAction::Attack));

        let again = tracker.advance(&[InputAction::Attack]);
        assert!(again.is_pressed(InputAction::Attack));
    }

    #[test]
    fn pressed_builder_implies_held() {
        let snapshot = InputSnapshot::empty().with_action_pressed(InputAction::ToggleRun, true);
        assert!(snapshot.is_down(InputAction::ToggleRun));
        assert!(snapshot.is_pressed(InputAction::ToggleRun));
        assert!(!snapshot.is_down(InputAction::MoveUp));
    }

    #[test]
    fn action_indices_are_distinct() {
        let mut states = ActionStates::default();
        for action in InputAction::ALL {
            assert!(!states.is_down(action));
            states.set(action, true);
        }
        assert!(InputAction::ALL.iter().all(|action| states.is_down(*action)));
    }
}
