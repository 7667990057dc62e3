//! # Automaton flags
//!
//! The flags mark which subsystems are logically active in a state. They carry no information of
//! their own: each [`StateId`] has exactly one flag combination, given by [`StateId::flags`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt::Display;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the internal flags of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flags {
    pub autodrive: bool,
    pub update_compass: bool,
    pub update_gps: bool,
    pub check_position: bool,
    pub r#move: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Tag of an automaton state, without any of the state's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateId {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Flags {
    /// All flags cleared, asserted by both terminal states.
    pub const CLEAR: Flags = Flags {
        autodrive: false,
        update_compass: false,
        update_gps: false,
        check_position: false,
        r#move: false,
    };
}

impl Default for Flags {
    /// The flags of a freshly started run, only `check_position` is set.
    fn default() -> Self {
        Flags {
            check_position: true,
            ..Flags::CLEAR
        }
    }
}

impl Display for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (self.autodrive, "autodrive"),
            (self.update_compass, "update_compass"),
            (self.update_gps, "update_gps"),
            (self.check_position, "check_position"),
            (self.r#move, "move"),
        ];

        let set: Vec<&str> = names.iter().filter(|(s, _)| *s).map(|(_, n)| *n).collect();

        write!(f, "[{}]", set.join(", "))
    }
}

impl StateId {
    /// Every state of the automaton, in order.
    pub const ALL: [StateId; 9] = [
        StateId::S1,
        StateId::S2,
        StateId::S3,
        StateId::S4,
        StateId::S5,
        StateId::S6,
        StateId::S7,
        StateId::S8,
        StateId::S9,
    ];

    /// The flag combination asserted by this state.
    pub fn flags(&self) -> Flags {
        let c = Flags::CLEAR;

        match self {
            StateId::S1 => Flags {
                check_position: true,
                ..c
            },
            StateId::S2 => Flags {
                autodrive: true,
                check_position: true,
                ..c
            },
            StateId::S3 => Flags {
                autodrive: true,
                update_compass: true,
                ..c
            },
            StateId::S4 => Flags {
                autodrive: true,
                update_gps: true,
                ..c
            },
            StateId::S5 => Flags {
                autodrive: true,
                r#move: true,
                ..c
            },
            StateId::S6 | StateId::S9 => c,
            StateId::S7 => Flags { r#move: true, ..c },
            StateId::S8 => Flags {
                update_compass: true,
                ..c
            },
        }
    }

    /// Terminal states only ever transition to themselves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StateId::S6 | StateId::S9)
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
