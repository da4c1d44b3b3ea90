//! Records produced while agents execute, for reporting and experiments.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::detour::Opportunity;
use crate::environment::TaxiId;
use crate::grid::Coord;

/// One accepted detour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetourRecord {
    pub taxi: TaxiId,
    /// Passenger the taxi was assigned when it took the detour.
    pub own_passenger: usize,
    pub opportunity: Opportunity,
}

/// Summary of one agent's run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReport {
    pub taxi: TaxiId,
    pub passenger: Option<usize>,
    pub actions_issued: usize,
    pub detours: Vec<DetourRecord>,
    /// Actions registered but never executed (e.g. a drop-off cell the
    /// recomputed route no longer passes through).
    pub pending_actions: Vec<(Coord, Action)>,
}

impl AgentReport {
    pub fn passengers_left_aboard(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending_actions.iter().filter_map(|(_, action)| match action {
            Action::DropOff(passenger) => Some(*passenger),
            _ => None,
        })
    }
}
