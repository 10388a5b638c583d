//! Generic state machinery - named machines with one active state each.
//!
//! A [`StateMachine`] owns a set of [`State`]s keyed by identifier and keeps at
//! most one of them active. A [`StateController`] owns several uniquely named
//! machines for one context and steps all of them once per phase, in
//! registration order.
//!
//! Hooks receive the owning context, never the machine itself, so a state
//! cannot start a transition on its own machine while one is running. Owners
//! that want states to request transitions queue the request on the context
//! and apply it after the phase.

use log::{debug, warn};
use std::collections::HashMap;
use vesper_core::{Result, VesperError};

/// A behavior unit over an owning context `C`.
///
/// Every hook defaults to a no-op; implement only what the state needs.
pub trait State<C> {
    fn on_enter(&mut self, _ctx: &mut C) {}
    fn on_exit(&mut self, _ctx: &mut C) {}
    fn on_update(&mut self, _ctx: &mut C) {}
    fn on_fixed_update(&mut self, _ctx: &mut C) {}
    fn on_late_update(&mut self, _ctx: &mut C) {}
}

/// A named machine with at most one active state.
pub struct StateMachine<C> {
    name: String,
    states: HashMap<String, Box<dyn State<C>>>,
    active: Option<String>,
    previous: Option<String>,
}

impl<C> StateMachine<C> {
    /// Creates an empty machine with no active state.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            states: HashMap::new(),
            active: None,
            previous: None,
        }
    }

    /// Builder form of [`add_state`](Self::add_state).
    pub fn with_state(mut self, id: &str, state: impl State<C> + 'static) -> Self {
        self.add_state(id, state);
        self
    }

    /// Register a state under `id`. Returns the state previously registered
    /// under that id, if any. Replacing the active state does not run hooks.
    pub fn add_state(
        &mut self,
        id: &str,
        state: impl State<C> + 'static,
    ) -> Option<Box<dyn State<C>>> {
        self.states.insert(id.to_string(), Box::new(state))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_state(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    /// Identifier of the active state, if any.
    pub fn active_state(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Identifier of the state that was active before the last transition.
    pub fn previous_state(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Transition to the state registered under `id`.
    ///
    /// Runs `on_exit` on the current state (if any) and then `on_enter` on the
    /// target, exactly once each. Changing to the already-active id runs both
    /// hooks again.
    ///
    /// An unknown `id` is logged and rejected with
    /// [`VesperError::UnknownState`]; the active state is left untouched.
    pub fn change_state(&mut self, id: &str, ctx: &mut C) -> Result<()> {
        if !self.states.contains_key(id) {
            warn!(
                "state machine '{}' has no state '{}', staying in {:?}",
                self.name, id, self.active
            );
            return Err(VesperError::UnknownState {
                machine: self.name.clone(),
                state: id.to_string(),
            });
        }

        if let Some(current) = self.active.take() {
            if let Some(state) = self.states.get_mut(&current) {
                state.on_exit(ctx);
            }
            self.previous = Some(current);
        }

        if let Some(state) = self.states.get_mut(id) {
            state.on_enter(ctx);
        }
        self.active = Some(id.to_string());

        debug!(
            "state machine '{}': {:?} -> '{}'",
            self.name, self.previous, id
        );
        Ok(())
    }

    /// Forward the per-frame phase to the active state.
    pub fn update(&mut self, ctx: &mut C) {
        if let Some(state) = self.active_mut() {
            state.on_update(ctx);
        }
    }

    /// Forward the physics phase to the active state.
    pub fn fixed_update(&mut self, ctx: &mut C) {
        if let Some(state) = self.active_mut() {
            state.on_fixed_update(ctx);
        }
    }

    /// Forward the late phase to the active state.
    pub fn late_update(&mut self, ctx: &mut C) {
        if let Some(state) = self.active_mut() {
            state.on_late_update(ctx);
        }
    }

    fn active_mut(&mut self) -> Option<&mut Box<dyn State<C>>> {
        let id = self.active.as_ref()?;
        self.states.get_mut(id)
    }
}

/// Owns the named state machines of one context.
///
/// Machines are stepped in registration order. Names are unique.
pub struct StateController<C> {
    machines: Vec<StateMachine<C>>,
}

impl<C> Default for StateController<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> StateController<C> {
    pub fn new() -> Self {
        Self {
            machines: Vec::new(),
        }
    }

    /// Register a machine. Fails if a machine with the same name exists.
    pub fn add_state_machine(&mut self, machine: StateMachine<C>) -> Result<()> {
        if self.machines.iter().any(|m| m.name == machine.name) {
            return Err(VesperError::DuplicateStateMachine(machine.name));
        }
        self.machines.push(machine);
        Ok(())
    }

    pub fn machine(&self, name: &str) -> Option<&StateMachine<C>> {
        self.machines.iter().find(|m| m.name == name)
    }

    pub fn machine_mut(&mut self, name: &str) -> Option<&mut StateMachine<C>> {
        self.machines.iter_mut().find(|m| m.name == name)
    }

    /// Names of all machines, in registration order.
    pub fn machine_names(&self) -> Vec<&str> {
        self.machines.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Active state of the named machine.
    pub fn active_state(&self, machine: &str) -> Option<&str> {
        self.machine(machine).and_then(|m| m.active_state())
    }

    /// Change the active state of the named machine.
    pub fn change_state(&mut self, machine: &str, id: &str, ctx: &mut C) -> Result<()> {
        match self.machine_mut(machine) {
            Some(m) => m.change_state(id, ctx),
            None => {
                warn!("no state machine named '{}'", machine);
                Err(VesperError::UnknownStateMachine(machine.to_string()))
            }
        }
    }

    pub fn update(&mut self, ctx: &mut C) {
        for machine in &mut self.machines {
            machine.update(ctx);
        }
    }

    pub fn fixed_update(&mut self, ctx: &mut C) {
        for machine in &mut self.machines {
            machine.fixed_update(ctx);
        }
    }

    pub fn late_update(&mut self, ctx: &mut C) {
        for machine in &mut self.machines {
            machine.late_update(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Context that records every hook call.
    type Log = Vec<String>;

    struct Recorder(&'static str);

    impl State<Log> for Recorder {
        fn on_enter(&mut self, log: &mut Log) {
            log.push(format!("{}:enter", self.0));
        }
        fn on_exit(&mut self, log: &mut Log) {
            log.push(format!("{}:exit", self.0));
        }
        fn on_update(&mut self, log: &mut Log) {
            log.push(format!("{}:update", self.0));
        }
        fn on_fixed_update(&mut self, log: &mut Log) {
            log.push(format!("{}:fixed", self.0));
        }
        fn on_late_update(&mut self, log: &mut Log) {
            log.push(format!("{}:late", self.0));
        }
    }

    /// Only overrides `on_enter`; the rest fall back to the defaults.
    struct Quiet;

    impl State<Log> for Quiet {
        fn on_enter(&mut self, log: &mut Log) {
            log.push("quiet:enter".into());
        }
    }

    fn machine(name: &str) -> StateMachine<Log> {
        StateMachine::new(name)
            .with_state("idle", Recorder("idle"))
            .with_state("run", Recorder("run"))
    }

    #[test]
    fn new_machine_has_no_active_state() {
        let sm = machine("STATUS");
        assert_eq!(sm.name(), "STATUS");
        assert!(sm.active_state().is_none());
        assert!(sm.has_state("idle"));
        assert!(!sm.has_state("fly"));
    }

    #[test]
    fn first_change_only_enters() {
        let mut sm = machine("STATUS");
        let mut log = Log::new();
        sm.change_state("idle", &mut log).unwrap();
        assert_eq!(log, vec!["idle:enter"]);
        assert_eq!(sm.active_state(), Some("idle"));
    }

    #[test]
    fn change_exits_then_enters() {
        let mut sm = machine("STATUS");
        let mut log = Log::new();
        sm.change_state("idle", &mut log).unwrap();
        log.clear();

        sm.change_state("run", &mut log).unwrap();
        assert_eq!(log, vec!["idle:exit", "run:enter"]);
        assert_eq!(sm.active_state(), Some("run"));
        assert_eq!(sm.previous_state(), Some("idle"));
    }

    #[test]
    fn unknown_state_keeps_active() {
        let mut sm = machine("STATUS");
        let mut log = Log::new();
        sm.change_state("idle", &mut log).unwrap();
        log.clear();

        let err = sm.change_state("fly", &mut log).unwrap_err();
        assert!(matches!(err, VesperError::UnknownState { .. }));
        assert_eq!(sm.active_state(), Some("idle"));
        assert!(log.is_empty());
    }

    #[test]
    fn unknown_state_on_empty_machine() {
        let mut sm = machine("STATUS");
        let mut log = Log::new();
        assert!(sm.change_state("fly", &mut log).is_err());
        assert!(sm.active_state().is_none());
    }

    #[test]
    fn reentering_same_state_runs_both_hooks() {
        let mut sm = machine("STATUS");
        let mut log = Log::new();
        sm.change_state("idle", &mut log).unwrap();
        sm.change_state("idle", &mut log).unwrap();
        assert_eq!(log, vec!["idle:enter", "idle:exit", "idle:enter"]);
    }

    #[test]
    fn phases_forward_to_active_state_only() {
        let mut sm = machine("STATUS");
        let mut log = Log::new();

        sm.update(&mut log);
        sm.fixed_update(&mut log);
        sm.late_update(&mut log);
        assert!(log.is_empty());

        sm.change_state("run", &mut log).unwrap();
        log.clear();
        sm.update(&mut log);
        sm.fixed_update(&mut log);
        sm.late_update(&mut log);
        assert_eq!(log, vec!["run:update", "run:fixed", "run:late"]);
    }

    #[test]
    fn default_hooks_are_noops() {
        let mut sm = StateMachine::new("FORM").with_state("quiet", Quiet);
        let mut log = Log::new();
        sm.change_state("quiet", &mut log).unwrap();
        sm.update(&mut log);
        sm.fixed_update(&mut log);
        sm.late_update(&mut log);
        assert_eq!(log, vec!["quiet:enter"]);
    }

    #[test]
    fn controller_rejects_duplicate_names() {
        let mut controller = StateController::new();
        controller.add_state_machine(machine("FORM")).unwrap();
        let err = controller.add_state_machine(machine("FORM")).unwrap_err();
        assert!(matches!(err, VesperError::DuplicateStateMachine(name) if name == "FORM"));
        assert_eq!(controller.len(), 1);
    }

    #[test]
    fn controller_steps_in_registration_order() {
        let mut controller = StateController::new();
        controller
            .add_state_machine(StateMachine::new("FORM").with_state("a", Recorder("form")))
            .unwrap();
        controller
            .add_state_machine(StateMachine::new("STATUS").with_state("a", Recorder("status")))
            .unwrap();
        assert_eq!(controller.machine_names(), vec!["FORM", "STATUS"]);

        let mut log = Log::new();
        controller.change_state("STATUS", "a", &mut log).unwrap();
        controller.change_state("FORM", "a", &mut log).unwrap();
        log.clear();

        controller.update(&mut log);
        controller.fixed_update(&mut log);
        controller.late_update(&mut log);
        assert_eq!(
            log,
            vec![
                "form:update",
                "status:update",
                "form:fixed",
                "status:fixed",
                "form:late",
                "status:late",
            ]
        );
    }

    #[test]
    fn controller_unknown_machine() {
        let mut controller: StateController<Log> = StateController::new();
        let mut log = Log::new();
        let err = controller.change_state("FORM", "a", &mut log).unwrap_err();
        assert!(matches!(err, VesperError::UnknownStateMachine(_)));
        assert!(controller.active_state("FORM").is_none());
    }
}
