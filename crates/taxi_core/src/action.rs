//! Discrete action vocabulary shared with the environment.
//!
//! Codes are fixed: `0` south, `1` north, `2` east, `3` west, `4` pickup and
//! `5 + p` to drop off passenger `p`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const PICKUP_CODE: u32 = 4;
pub const DROP_OFF_PASSENGER_ZERO_CODE: u32 = 5;

/// One step across an edge of the grid graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    South,
    North,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
    ];

    pub fn code(self) -> u32 {
        match self {
            Direction::South => 0,
            Direction::North => 1,
            Direction::East => 2,
            Direction::West => 3,
        }
    }

    /// Row and column offsets applied by this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::South => (1, 0),
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }
}

/// An action issued to a single taxi for one environment tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Move(Direction),
    /// Board the waiting passenger at the taxi's cell (resolved by the environment).
    Pickup,
    /// Drop off the passenger with this index.
    DropOff(usize),
}

impl Action {
    /// Integer code for this action, or `None` when a drop-off index is too
    /// large for the `u32` code space.
    pub fn code(self) -> Option<u32> {
        match self {
            Action::Move(direction) => Some(direction.code()),
            Action::Pickup => Some(PICKUP_CODE),
            Action::DropOff(passenger) => u32::try_from(passenger)
                .ok()
                .and_then(|index| index.checked_add(DROP_OFF_PASSENGER_ZERO_CODE)),
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Action::Move(Direction::South),
            1 => Action::Move(Direction::North),
            2 => Action::Move(Direction::East),
            3 => Action::Move(Direction::West),
            PICKUP_CODE => Action::Pickup,
            other => Action::DropOff((other - DROP_OFF_PASSENGER_ZERO_CODE) as usize),
        }
    }

    pub fn is_move(self) -> bool {
        matches!(self, Action::Move(_))
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        Action::Move(direction)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(direction) => write!(f, "move {:?}", direction),
            Action::Pickup => f.write_str("pickup"),
            Action::DropOff(passenger) => write!(f, "drop off passenger {}", passenger),
        }
    }
}
