//! Roster, round rotation, and history engine for Lollypop paired questions.
//!
//! A class roster feeds a two-seat round: one student answers (the
//! responder), another asks (the questioner). Seats are filled at random from
//! the students who have not yet succeeded, each student may refuse a seat
//! once, and every resolved round is written to a history log. Saved class
//! lists live in a small JSON store so a roster can be reloaded between
//! sessions, while the rotation itself is deliberately kept in memory only.

pub mod classlist;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod import;
pub mod random;
pub mod roster;
pub mod round;
pub mod session;

pub use classlist::{ClassList, ClassListStore, ClassLists};
pub use config::SessionConfig;
pub use controller::{Refusal, Resolution, RoundController, Selection};
pub use error::{LollyError, LollyResult};
pub use history::{History, HistoryEntry};
pub use random::{RandomSource, StdRandom};
pub use roster::{Roster, RosterCounts, Student, StudentId, StudentStatus};
pub use round::{Role, Round, RoundState, Winner};
pub use session::LollySession;
