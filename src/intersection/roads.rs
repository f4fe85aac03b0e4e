use serde::{Deserialize, Serialize};
use std::fmt;

use crate::control_system::ControlError;

/// One of the four approaches into the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoadId {
    R1,
    R2,
    R3,
    R4,
}

impl RoadId {
    pub const ALL: [RoadId; 4] = [RoadId::R1, RoadId::R2, RoadId::R3, RoadId::R4];

    pub fn number(self) -> u8 {
        match self {
            RoadId::R1 => 1,
            RoadId::R2 => 2,
            RoadId::R3 => 3,
            RoadId::R4 => 4,
        }
    }

    /// The road that follows this one in round-robin order (`(id mod 4) + 1`).
    pub fn next(self) -> RoadId {
        match self {
            RoadId::R1 => RoadId::R2,
            RoadId::R2 => RoadId::R3,
            RoadId::R3 => RoadId::R4,
            RoadId::R4 => RoadId::R1,
        }
    }

    /// Opposite roads share a pair: R1 with R3, R2 with R4.
    pub fn pair(self) -> Pair {
        match self {
            RoadId::R1 | RoadId::R3 => Pair::Pair13,
            RoadId::R2 | RoadId::R4 => Pair::Pair24,
        }
    }

    pub fn compass(self) -> &'static str {
        match self {
            RoadId::R1 => "North",
            RoadId::R2 => "East",
            RoadId::R3 => "South",
            RoadId::R4 => "West",
        }
    }
}

impl TryFrom<u8> for RoadId {
    type Error = ControlError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RoadId::R1),
            2 => Ok(RoadId::R2),
            3 => Ok(RoadId::R3),
            4 => Ok(RoadId::R4),
            other => Err(ControlError::InvalidRoad(other)),
        }
    }
}

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "R{}", self.number())
    }
}

/// Fixed grouping of opposite roads that move together in paired mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pair {
    Pair13,
    Pair24,
}

impl Pair {
    pub fn members(self) -> [RoadId; 2] {
        match self {
            Pair::Pair13 => [RoadId::R1, RoadId::R3],
            Pair::Pair24 => [RoadId::R2, RoadId::R4],
        }
    }

    pub fn contains(self, road: RoadId) -> bool {
        road.pair() == self
    }

    pub fn opposite(self) -> Pair {
        match self {
            Pair::Pair13 => Pair::Pair24,
            Pair::Pair24 => Pair::Pair13,
        }
    }

    // Road that takes the right-of-way when the paired cycle hands over to this pair.
    pub fn entry_road(self) -> RoadId {
        match self {
            Pair::Pair13 => RoadId::R1,
            Pair::Pair24 => RoadId::R2,
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Pair::Pair13 => write!(f, "13"),
            Pair::Pair24 => write!(f, "24"),
        }
    }
}

/// The color a vehicle signal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            LightState::Green => "green",
            LightState::Yellow => "yellow",
            LightState::Red => "red",
        };
        write!(f, "{}", label)
    }
}
