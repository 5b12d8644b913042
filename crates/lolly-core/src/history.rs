//! Round history: most recent first, never rewritten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::roster::{Roster, StudentId};

/// Fallback shown for a student no longer on the roster.
pub const UNKNOWN_STUDENT: &str = "Unknown";

/// Outcome text for a round nobody won.
pub const NO_WINNER: &str = "No winner";

/// A resolved round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Who answered.
    pub responder_id: StudentId,
    /// Who asked.
    pub questioner_id: StudentId,
    /// `"<name> succeeded"` or `"No winner"`.
    pub outcome: String,
    /// When the round was resolved.
    pub timestamp: DateTime<Utc>,
}

/// Most-recent-first log of resolved rounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a round. The newest entry comes first.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-line description: `responder ↔ questioner • outcome`.
    pub fn describe(entry: &HistoryEntry, roster: &Roster) -> String {
        let (responder, questioner) = names(entry, roster);
        format!("{responder} ↔ {questioner} • {}", entry.outcome)
    }

    /// Export the history as markdown.
    pub fn export_markdown(&self, roster: &Roster) -> String {
        let mut out = String::from("# Lollypop Round History\n\n");
        if self.entries.is_empty() {
            out.push_str("_No rounds recorded yet._\n");
            return out;
        }
        for entry in &self.entries {
            let (responder, questioner) = names(entry, roster);
            out.push_str(&format!(
                "- **{responder}** ↔ **{questioner}** • {} ({})\n",
                entry.outcome,
                entry.timestamp.format("%H:%M")
            ));
        }
        out
    }

    /// Export the history as plain text.
    pub fn export_text(&self, roster: &Roster) -> String {
        let mut out = String::from("Lollypop Round History\n======================\n\n");
        if self.entries.is_empty() {
            out.push_str("No rounds recorded yet.\n");
            return out;
        }
        for entry in &self.entries {
            out.push_str(&format!(
                "[{}] {}\n",
                entry.timestamp.format("%H:%M"),
                Self::describe(entry, roster)
            ));
        }
        out
    }
}

fn names<'a>(entry: &HistoryEntry, roster: &'a Roster) -> (&'a str, &'a str) {
    let lookup = move |id: StudentId| {
        roster
            .get(id)
            .map_or(UNKNOWN_STUDENT, |s| s.name.as_str())
    };
    (lookup(entry.responder_id), lookup(entry.questioner_id))
}
