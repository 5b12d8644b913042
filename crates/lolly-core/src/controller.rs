//! Round controller: seat selection, refusals, and resolution.
//!
//! `RoundController` owns the roster, the current round, and the history, and
//! is the only thing that mutates them. Every operation completes
//! synchronously and reports its result as a value; an empty pool or a spent
//! refusal is an outcome to show the user, never an error.

use std::fmt;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::classlist::ClassList;
use crate::history::{History, HistoryEntry, NO_WINNER};
use crate::random::{RandomSource, StdRandom};
use crate::roster::{Roster, Student, StudentId, StudentStatus};
use crate::round::{Role, Round, Winner};

/// Result of trying to fill a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A student was seated.
    Selected {
        /// The seat filled.
        role: Role,
        /// The student seated.
        id: StudentId,
        /// The student's name.
        name: String,
        /// Set when a responder was seated and nobody is left to ask.
        questioner_blocked: bool,
    },
    /// Nobody could take the seat; the round is unchanged.
    NoEligible {
        /// The seat that stayed empty.
        role: Role,
    },
}

impl Selection {
    /// The seated student, if any.
    pub fn selected(&self) -> Option<StudentId> {
        match self {
            Self::Selected { id, .. } => Some(*id),
            Self::NoEligible { .. } => None,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selected {
                role,
                name,
                questioner_blocked,
                ..
            } => {
                write!(f, "{name} selected as {role}.")?;
                if *questioner_blocked {
                    write!(f, " Need another active student before selecting a questioner.")?;
                }
                Ok(())
            }
            Self::NoEligible { .. } => write!(
                f,
                "No eligible students available. Check that enough students remain active."
            ),
        }
    }
}

/// Result of a seated student refusing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The seat was empty.
    NoOccupant {
        /// The empty seat.
        role: Role,
    },
    /// The student had already refused once; nothing changed.
    AlreadyUsed {
        /// The student who tried to refuse.
        name: String,
    },
    /// The refusal was recorded and a replacement attempted.
    Replaced {
        /// The student who refused.
        refused: String,
        /// The replacement pick, which may have found nobody.
        replacement: Selection,
    },
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOccupant { role } => write!(f, "No {role} selected."),
            Self::AlreadyUsed { name } => write!(f, "{name} has already used their refusal."),
            Self::Replaced {
                refused,
                replacement,
            } => write!(
                f,
                "{refused} used their one refusal. Selecting a replacement.\n{replacement}"
            ),
        }
    }
}

/// Result of resolving a round.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The outcome was applied and logged.
    Recorded {
        /// Who won.
        winner: Winner,
        /// Responder's name at resolution time.
        responder: String,
        /// Questioner's name at resolution time.
        questioner: String,
        /// The history entry written.
        entry: HistoryEntry,
    },
    /// A seat was empty or its student was gone; the round was reset.
    Abandoned,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recorded {
                winner,
                responder,
                questioner,
                ..
            } => match winner {
                Winner::Responder => write!(
                    f,
                    "{responder} succeeded and leaves the rotation. {questioner} returns to the pool."
                ),
                Winner::Questioner => write!(
                    f,
                    "{questioner} succeeded and leaves the rotation. {responder} returns to the pool."
                ),
                Winner::None => write!(f, "No winner recorded. Both students return to the pool."),
            },
            Self::Abandoned => write!(f, "Round reset. Both seats must be filled to record a result."),
        }
    }
}

/// Owns the roster, the round, and the history.
#[derive(Debug)]
pub struct RoundController<R = StdRandom> {
    roster: Roster,
    round: Round,
    history: History,
    rng: R,
}

impl RoundController<StdRandom> {
    /// Controller with a `StdRng` source, seeded when `seed` is set.
    pub fn with_seed(seed: Option<u64>) -> Self {
        Self::new(StdRandom::from_seed(seed))
    }
}

impl<R: RandomSource> RoundController<R> {
    /// Empty controller drawing picks from `rng`.
    pub fn new(rng: R) -> Self {
        Self {
            roster: Roster::new(),
            round: Round::new(),
            history: History::new(),
            rng,
        }
    }

    /// The roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The current round.
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// The history, newest first.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The student in a seat, if still on the roster.
    pub fn seated(&self, role: Role) -> Option<&Student> {
        self.round.seat(role).and_then(|id| self.roster.get(id))
    }

    // -----------------------------------------------------------------------
    // Roster edits
    // -----------------------------------------------------------------------

    /// Add students by name. Returns how many were new.
    pub fn add_students<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.roster.add(names)
    }

    /// Remove a student, vacating any seat they held.
    pub fn remove_student(&mut self, id: StudentId) -> Option<Student> {
        let student = self.roster.remove(id)?;
        for role in self.round.vacate(id) {
            debug!(name = %student.name, %role, "seat vacated by removal");
        }
        Some(student)
    }

    /// Return a completed student to the rotation.
    pub fn restore_to_active(&mut self, id: StudentId) -> bool {
        self.roster.restore_to_active(id)
    }

    /// Give a student their refusal back.
    pub fn reset_refusal(&mut self, id: StudentId) -> bool {
        self.roster.reset_refusal(id)
    }

    /// Empty the roster, the round, and the history.
    pub fn clear_roster(&mut self) {
        self.roster.clear();
        self.round.reset();
        self.history.clear();
        info!("roster cleared");
    }

    /// Empty the history only.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Replace the roster with a saved class list. Returns students loaded.
    pub fn load_class_list(&mut self, list: &ClassList) -> usize {
        self.clear_roster();
        let loaded = self.roster.add(&list.students);
        info!(class = %list.name, loaded, "class list loaded");
        loaded
    }

    // -----------------------------------------------------------------------
    // Round
    // -----------------------------------------------------------------------

    /// Whether a pick for `role` can currently succeed.
    ///
    /// The questioner seat also needs a responder, so seats fill in order.
    pub fn can_select(&self, role: Role) -> bool {
        match role {
            Role::Responder => !self.roster.eligible(self.round.questioner()).is_empty(),
            Role::Questioner => self
                .round
                .responder()
                .is_some_and(|id| !self.roster.eligible(Some(id)).is_empty()),
        }
    }

    /// Fill a seat uniformly at random from the eligible pool.
    ///
    /// The pool is every active student except whoever holds the other seat.
    /// An occupied seat is re-drawn.
    pub fn select_random(&mut self, role: Role) -> Selection {
        self.fill_seat(role, None)
    }

    /// The seated student declines, once per student.
    ///
    /// Marks the refusal, empties the seat, and immediately draws a
    /// replacement other than the refusing student.
    pub fn refuse(&mut self, role: Role) -> Refusal {
        let Some(id) = self.round.seat(role) else {
            return Refusal::NoOccupant { role };
        };
        let Some(student) = self.roster.get_mut(id) else {
            self.round.set(role, None);
            return Refusal::NoOccupant { role };
        };
        if student.refusal_used {
            return Refusal::AlreadyUsed {
                name: student.name.clone(),
            };
        }

        student.refusal_used = true;
        let refused = student.name.clone();
        debug!(name = %refused, %role, "refusal used");

        self.round.set(role, None);
        let replacement = self.fill_seat(role, Some(id));
        Refusal::Replaced {
            refused,
            replacement,
        }
    }

    /// Apply the round's outcome, log it, and empty both seats.
    ///
    /// With a seat empty or its student removed, the round is reset and
    /// nothing is logged.
    pub fn resolve(&mut self, winner: Winner) -> Resolution {
        let seated = self
            .seated(Role::Responder)
            .zip(self.seated(Role::Questioner))
            .map(|(r, q)| (r.id, r.name.clone(), q.id, q.name.clone()));
        let Some((responder_id, responder, questioner_id, questioner)) = seated else {
            if self.round.is_ready() {
                warn!("seated student no longer on the roster; round reset");
            } else {
                debug!("resolve with an empty seat; round reset");
            }
            self.round.reset();
            return Resolution::Abandoned;
        };

        let outcome = match winner.role() {
            Some(role) => {
                let (id, name) = match role {
                    Role::Responder => (responder_id, &responder),
                    Role::Questioner => (questioner_id, &questioner),
                };
                if let Some(s) = self.roster.get_mut(id) {
                    s.status = StudentStatus::Completed;
                }
                format!("{name} succeeded")
            }
            None => NO_WINNER.to_string(),
        };

        let entry = HistoryEntry {
            responder_id,
            questioner_id,
            outcome,
            timestamp: Utc::now(),
        };
        info!(outcome = %entry.outcome, "round resolved");
        self.history.append(entry.clone());
        self.round.reset();

        Resolution::Recorded {
            winner,
            responder,
            questioner,
            entry,
        }
    }

    /// Abandon the round without logging.
    pub fn reset_round(&mut self) {
        self.round.reset();
    }

    fn fill_seat(&mut self, role: Role, also_exclude: Option<StudentId>) -> Selection {
        let other = self.round.seat(role.other());
        let pool: Vec<&Student> = self
            .roster
            .eligible(other)
            .into_iter()
            .filter(|s| Some(s.id) != also_exclude)
            .collect();
        if pool.is_empty() {
            debug!(%role, "no eligible students");
            return Selection::NoEligible { role };
        }

        let chosen = pool[self.rng.pick(pool.len())];
        let (id, name) = (chosen.id, chosen.name.clone());
        self.round.set(role, Some(id));

        let questioner_blocked = role == Role::Responder
            && self.round.questioner().is_none()
            && self.roster.eligible(Some(id)).is_empty();
        debug!(%name, %role, questioner_blocked, "seat filled");

        Selection::Selected {
            role,
            id,
            name,
            questioner_blocked,
        }
    }
}
