//! The two-seat round: who answers, who asks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::StudentId;

/// A seat in the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Answers the question.
    Responder,
    /// Poses the question.
    Questioner,
}

impl Role {
    /// The opposite seat.
    pub fn other(self) -> Self {
        match self {
            Self::Responder => Self::Questioner,
            Self::Questioner => Self::Responder,
        }
    }

    /// Parse a role name (case-insensitive, short forms accepted).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "responder" | "r" | "answer" => Some(Self::Responder),
            "questioner" | "q" | "ask" => Some(Self::Questioner),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Responder => write!(f, "responder"),
            Self::Questioner => write!(f, "questioner"),
        }
    }
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// The responder succeeded.
    Responder,
    /// The questioner succeeded.
    Questioner,
    /// Nobody succeeded.
    None,
}

impl Winner {
    /// Parse an outcome name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "no" | "nobody" => Some(Self::None),
            other => Role::parse(other).map(Self::from),
        }
    }

    /// The seat that won, if any.
    pub fn role(self) -> Option<Role> {
        match self {
            Self::Responder => Some(Role::Responder),
            Self::Questioner => Some(Role::Questioner),
            Self::None => None,
        }
    }
}

impl From<Role> for Winner {
    fn from(role: Role) -> Self {
        match role {
            Role::Responder => Self::Responder,
            Role::Questioner => Self::Questioner,
        }
    }
}

/// Which seats are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// No seat filled.
    Empty,
    /// Only the responder is seated.
    ResponderSet,
    /// Only the questioner is seated.
    QuestionerSet,
    /// Both seats filled; the round can be resolved.
    BothSet,
}

/// The current round's seats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    responder: Option<StudentId>,
    questioner: Option<StudentId>,
}

impl Round {
    /// Create an empty round.
    pub fn new() -> Self {
        Self::default()
    }

    /// The student in a seat.
    pub fn seat(&self, role: Role) -> Option<StudentId> {
        match role {
            Role::Responder => self.responder,
            Role::Questioner => self.questioner,
        }
    }

    /// The responder, if seated.
    pub fn responder(&self) -> Option<StudentId> {
        self.responder
    }

    /// The questioner, if seated.
    pub fn questioner(&self) -> Option<StudentId> {
        self.questioner
    }

    pub(crate) fn set(&mut self, role: Role, id: Option<StudentId>) {
        match role {
            Role::Responder => self.responder = id,
            Role::Questioner => self.questioner = id,
        }
    }

    /// Vacate every seat the student occupies. Returns the seats cleared.
    pub(crate) fn vacate(&mut self, id: StudentId) -> Vec<Role> {
        let mut cleared = Vec::new();
        for role in [Role::Responder, Role::Questioner] {
            if self.seat(role) == Some(id) {
                self.set(role, None);
                cleared.push(role);
            }
        }
        cleared
    }

    /// Empty both seats.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Which seats are filled.
    pub fn state(&self) -> RoundState {
        match (self.responder, self.questioner) {
            (None, None) => RoundState::Empty,
            (Some(_), None) => RoundState::ResponderSet,
            (None, Some(_)) => RoundState::QuestionerSet,
            (Some(_), Some(_)) => RoundState::BothSet,
        }
    }

    /// Whether both seats are filled.
    pub fn is_ready(&self) -> bool {
        self.state() == RoundState::BothSet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_transitions() {
        let mut r = Round::new();
        assert_eq!(r.state(), RoundState::Empty);
        let a = StudentId::new();
        let b = StudentId::new();
        r.set(Role::Responder, Some(a));
        assert_eq!(r.state(), RoundState::ResponderSet);
        r.set(Role::Questioner, Some(b));
        assert!(r.is_ready());
        r.set(Role::Responder, None);
        assert_eq!(r.state(), RoundState::QuestionerSet);
        r.reset();
        assert_eq!(r.state(), RoundState::Empty);
    }

    #[test]
    fn vacate_clears_matching_seat() {
        let mut r = Round::new();
        let a = StudentId::new();
        let b = StudentId::new();
        r.set(Role::Responder, Some(a));
        r.set(Role::Questioner, Some(b));
        assert_eq!(r.vacate(b), vec![Role::Questioner]);
        assert_eq!(r.responder(), Some(a));
        assert!(r.vacate(StudentId::new()).is_empty());
    }

    #[test]
    fn parse_roles_and_winners() {
        assert_eq!(Role::parse("Responder"), Some(Role::Responder));
        assert_eq!(Role::parse("q"), Some(Role::Questioner));
        assert_eq!(Role::parse("judge"), None);
        assert_eq!(Winner::parse("none"), Some(Winner::None));
        assert_eq!(Winner::parse("questioner"), Some(Winner::Questioner));
        assert_eq!(Winner::Responder.role(), Some(Role::Responder));
        assert_eq!(Role::Responder.other(), Role::Questioner);
    }
}
