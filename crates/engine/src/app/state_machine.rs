use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;
use tracing::{debug, warn};

use super::rendering::RenderList;

/// Closed set of state names for one kind of entity.
pub trait StateKey: Copy + Eq + Hash + Debug + 'static {
    const ALL: &'static [Self];

    /// States reachable from `self` in one step.
    fn transitions(self) -> &'static [Self];

    fn name(self) -> &'static str;
}

/// Behaviour policy driven by a [`StateMachine`].
///
/// `C` is the per-frame context the owning entity builds (its data record plus
/// read-only views of the world). Returning `Some(key)` from `update` or
/// `signal` asks the machine to transition.
pub trait State<C: ?Sized> {
    type Key: StateKey;
    type Signal;

    fn enter(&mut self, _ctx: &mut C) {}

    fn exit(&mut self, _ctx: &mut C) {}

    fn update(&mut self, dt: f32, ctx: &mut C) -> Option<Self::Key>;

    fn signal(&mut self, _signal: &Self::Signal, _ctx: &mut C) -> Option<Self::Key> {
        None
    }
}

/// Read-only draw hook for state-specific overlays.
pub trait StateOverlay<V: ?Sized> {
    fn render(&self, _view: &V, _out: &mut RenderList) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    #[error("state '{state}' registered twice")]
    DuplicateState { state: &'static str },
    #[error("state '{state}' is not registered")]
    MissingState { state: &'static str },
    #[error("transition '{from}' -> '{to}' targets an unregistered state")]
    DanglingTransition {
        from: &'static str,
        to: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct StateMachine<K: StateKey, S> {
    states: HashMap<K, S>,
    current: Option<K>,
}

impl<K: StateKey, S> Default for StateMachine<K, S> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
        }
    }
}

impl<K: StateKey, S> StateMachine<K, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K, state: S) -> Result<(), StateMachineError> {
        if self.states.contains_key(&key) {
            return Err(StateMachineError::DuplicateState { state: key.name() });
        }
        self.states.insert(key, state);
        Ok(())
    }

    /// Checks that every key has a state behind it, then that every
    /// transition target does.
    pub fn validate(&self) -> Result<(), StateMachineError> {
        if let Some(missing) = K::ALL.iter().find(|key| !self.states.contains_key(*key)) {
            return Err(StateMachineError::MissingState {
                state: missing.name(),
            });
        }
        for key in K::ALL {
            for target in key.transitions() {
                if !self.states.contains_key(target) {
                    return Err(StateMachineError::DanglingTransition {
                        from: key.name(),
                        to: target.name(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn current_key(&self) -> Option<K> {
        self.current
    }

    pub fn is_current(&self, key: K) -> bool {
        self.current == Some(key)
    }

    pub fn current_state(&self) -> Option<&S> {
        self.current.and_then(|key| self.states.get(&key))
    }

    pub fn current_state_mut(&mut self) -> Option<&mut S> {
        let key = self.current?;
        self.states.get_mut(&key)
    }

    pub fn state(&self, key: K) -> Option<&S> {
        self.states.get(&key)
    }

    pub fn state_mut(&mut self, key: K) -> Option<&mut S> {
        self.states.get_mut(&key)
    }

    pub fn render<V: ?Sized>(&self, view: &V, out: &mut RenderList) -> bool
    where
        S: StateOverlay<V>,
    {
        self.current_state()
            .is_some_and(|state| state.render(view, out))
    }
}

impl<K: StateKey, S> StateMachine<K, S> {
    /// Validates the registry and enters `initial`.
    pub fn start<C: ?Sized>(&mut self, initial: K, ctx: &mut C) -> Result<(), StateMachineError>
    where
        S: State<C, Key = K>,
    {
        self.validate()?;
        self.current = None;
        self.change(initial, ctx);
        Ok(())
    }

    /// Exits the current state and enters `key`.
    ///
    /// Changing to the active state is a no-op, so an in-progress action is
    /// never restarted. Transitions outside the table are refused.
    pub fn change<C: ?Sized>(&mut self, key: K, ctx: &mut C) -> bool
    where
        S: State<C, Key = K>,
    {
        if self.current == Some(key) {
            return false;
        }
        if !self.states.contains_key(&key) {
            warn!(state = key.name(), "state_change_unregistered");
            return false;
        }
        if let Some(previous) = self.current {
            if !previous.transitions().contains(&key) {
                warn!(
                    from = previous.name(),
                    to = key.name(),
                    "state_change_refused"
                );
                return false;
            }
            if let Some(state) = self.states.get_mut(&previous) {
                state.exit(ctx);
            }
            debug!(from = previous.name(), to = key.name(), "state_change");
        }
        self.current = Some(key);
        if let Some(state) = self.states.get_mut(&key) {
            state.enter(ctx);
        }
        true
    }

    /// Runs the active state; returns the new key if it requested a transition
    /// that was applied.
    pub fn update<C: ?Sized>(&mut self, dt: f32, ctx: &mut C) -> Option<K>
    where
        S: State<C, Key = K>,
    {
        let key = self.current?;
        let next = self.states.get_mut(&key)?.update(dt, ctx)?;
        self.change(next, ctx).then_some(next)
    }

    /// Delivers `signal` to the active state only. Inactive states never see
    /// it, which is what makes stale timer firings harmless.
    pub fn signal<C: ?Sized>(
        &mut self,
        signal: &<S as State<C>>::Signal,
        ctx: &mut C,
    ) -> Option<K>
    where
        S: State<C, Key = K>,
    {
        let key = self.current?;
        let next = self.states.get_mut(&key)?.signal(signal, ctx)?;
        self.change(next, ctx).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Light {
        Red,
        Green,
        Amber,
    }

    impl StateKey for Light {
        const ALL: &'static [Self] = &[Light::Red, Light::Green, Light::Amber];

        fn transitions(self) -> &'static [Self] {
            match self {
                Light::Red => &[Light::Green],
                Light::Green => &[Light::Amber],
                Light::Amber => &[Light::Red],
            }
        }

        fn name(self) -> &'static str {
            match self {
                Light::Red => "red",
                Light::Green => "green",
                Light::Amber => "amber",
            }
        }
    }

    #[derive(Default)]
    struct Log {
        entries: Vec<String>,
    }

    struct Lamp {
        key: Light,
        next_after: Option<(f32, Light)>,
        elapsed: f32,
    }

    impl Lamp {
        fn new(key: Light) -> Self {
            Self {
                key,
                next_after: None,
                elapsed: 0.0,
            }
        }
    }

    impl State<Log> for Lamp {
        type Key = Light;
        type Signal = Light;

        fn enter(&mut self, ctx: &mut Log) {
            self.elapsed = 0.0;
            ctx.entries.push(format!("enter {}", self.key.name()));
        }

        fn exit(&mut self, ctx: &mut Log) {
            ctx.entries.push(format!("exit {}", self.key.name()));
        }

        fn update(&mut self, dt: f32, _ctx: &mut Log) -> Option<Light> {
            self.elapsed += dt;
            let (after, next) = self.next_after?;
            (self.elapsed >= after).then_some(next)
        }

        fn signal(&mut self, signal: &Light, _ctx: &mut Log) -> Option<Light> {
            Some(*signal)
        }
    }

    impl StateOverlay<Log> for Lamp {}

    fn full_machine() -> StateMachine<Light, Lamp> {
        let mut machine = StateMachine::new();
        for key in Light::ALL {
            machine.add(*key, Lamp::new(*key)).expect("add");
        }
        machine
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut machine = full_machine();
        let err = machine.add(Light::Red, Lamp::new(Light::Red)).expect_err("dup");
        assert_eq!(err, StateMachineError::DuplicateState { state: "red" });
    }

    #[test]
    fn start_fails_fast_on_missing_state() {
        let mut machine = StateMachine::new();
        machine.add(Light::Red, Lamp::new(Light::Red)).expect("add");
        let mut log = Log::default();
        let err = machine.start(Light::Red, &mut log).expect_err("incomplete");
        assert_eq!(err, StateMachineError::MissingState { state: "green" });
        assert!(log.entries.is_empty());
        assert_eq!(machine.current_key(), None);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Door {
        Open,
        Closed,
        Locked,
    }

    impl StateKey for Door {
        // `Locked` is reachable but missing from the key set.
        const ALL: &'static [Self] = &[Door::Open, Door::Closed];

        fn transitions(self) -> &'static [Self] {
            match self {
                Door::Open => &[Door::Closed],
                Door::Closed => &[Door::Open, Door::Locked],
                Door::Locked => &[Door::Closed],
            }
        }

        fn name(self) -> &'static str {
            match self {
                Door::Open => "open",
                Door::Closed => "closed",
                Door::Locked => "locked",
            }
        }
    }

    #[test]
    fn start_rejects_transition_to_unregistered_state() {
        let mut machine: StateMachine<Door, ()> = StateMachine::new();
        machine.add(Door::Open, ()).expect("add");
        machine.add(Door::Closed, ()).expect("add");
        assert_eq!(
            machine.validate(),
            Err(StateMachineError::DanglingTransition {
                from: "closed",
                to: "locked",
            })
        );
    }

    #[test]
    fn update_without_current_state_is_noop() {
        let mut machine = full_machine();
        let mut log = Log::default();
        assert_eq!(machine.update(1.0, &mut log), None);
        assert!(log.entries.is_empty());
    }

    #[test]
    fn change_runs_exit_then_enter() {
        let mut machine = full_machine();
        let mut log = Log::default();
        machine.start(Light::Red, &mut log).expect("start");
        assert!(machine.change(Light::Green, &mut log));
        assert_eq!(log.entries, vec!["enter red", "exit red", "enter green"]);
        assert!(machine.is_current(Light::Green));
    }

    #[test]
    fn change_to_current_state_does_not_reenter() {
        let mut machine = full_machine();
        let mut log = Log::default();
        machine.start(Light::Red, &mut log).expect("start");
        assert!(!machine.change(Light::Red, &mut log));
        assert_eq!(log.entries, vec!["enter red"]);
    }

    #[test]
    fn transition_outside_table_is_refused() {
        let mut machine = full_machine();
        let mut log = Log::default();
        machine.start(Light::Red, &mut log).expect("start");
        assert!(!machine.change(Light::Amber, &mut log));
        assert!(machine.is_current(Light::Red));
        assert_eq!(log.entries, vec!["enter red"]);
    }

    #[test]
    fn update_applies_requested_transition() {
        let mut machine = full_machine();
        machine.state_mut(Light::Red).expect("red").next_after = Some((1.0, Light::Green));
        let mut log = Log::default();
        machine.start(Light::Red, &mut log).expect("start");
        assert_eq!(machine.update(0.5, &mut log), None);
        assert_eq!(machine.update(0.5, &mut log), Some(Light::Green));
        assert!(machine.is_current(Light::Green));
    }

    #[test]
    fn signal_reaches_only_current_state() {
        let mut machine = full_machine();
        let mut log = Log::default();
        machine.start(Light::Green, &mut log).expect("start");
        assert_eq!(machine.signal(&Light::Amber, &mut log), Some(Light::Amber));
        assert_eq!(machine.signal(&Light::Amber, &mut log), None);
    }

    #[test]
    fn default_overlay_draws_nothing() {
        let machine = full_machine();
        let mut out = RenderList::default();
        assert!(!machine.render(&Log::default(), &mut out));
        assert!(out.is_empty());
    }
}
