use std::cell::Cell;
use std::collections::BTreeMap;

use taxi_core::action::Action;
use taxi_core::environment::{EnvSnapshot, TaxiEnvironment, TaxiId};
use taxi_core::world::GridWorld;

/// Wraps a [`GridWorld`] and records every `step` call as submitted.
pub struct RecordingEnv {
    pub world: GridWorld,
    pub steps: Vec<BTreeMap<TaxiId, Action>>,
    pub renders: Cell<usize>,
}

impl RecordingEnv {
    pub fn new(world: GridWorld) -> Self {
        Self {
            world,
            steps: Vec::new(),
            renders: Cell::new(0),
        }
    }

    /// Actions in submission order, panicking if any step carried other
    /// than exactly one action.
    pub fn single_actions(&self) -> Vec<(TaxiId, Action)> {
        self.steps
            .iter()
            .map(|step| {
                assert_eq!(step.len(), 1, "each step should carry one action");
                let (&taxi, &action) = step.iter().next().expect("one action");
                (taxi, action)
            })
            .collect()
    }
}

impl TaxiEnvironment for RecordingEnv {
    fn snapshot(&self) -> EnvSnapshot {
        self.world.snapshot()
    }

    fn step(&mut self, actions: &BTreeMap<TaxiId, Action>) {
        self.steps.push(actions.clone());
        self.world.step(actions);
    }

    fn render(&self) {
        self.renders.set(self.renders.get() + 1);
    }
}
