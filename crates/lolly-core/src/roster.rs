//! The class roster: students, their status, and their refusal flag.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;
use tracing::info;
use uuid::Uuid;

/// Minimum similarity score for fuzzy name matching (0.0-1.0).
const FUZZY_THRESHOLD: f64 = 0.8;

/// Unique identifier for a student, stable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(pub Uuid);

impl StudentId {
    /// Generate a new random student ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Whether a student is still in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    /// Waiting for a turn; eligible for selection.
    #[default]
    Active,
    /// Won a round and left the rotation.
    Completed,
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Completed => write!(f, "Complete"),
        }
    }
}

/// A student on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Session-unique identifier.
    pub id: StudentId,
    /// Display name, trimmed and non-empty.
    pub name: String,
    /// Rotation status.
    pub status: StudentStatus,
    /// Whether the student's single refusal has been spent.
    pub refusal_used: bool,
}

impl Student {
    fn new(name: impl Into<String>) -> Self {
        Self {
            id: StudentId::new(),
            name: name.into(),
            status: StudentStatus::Active,
            refusal_used: false,
        }
    }

    /// Whether the student can be picked for a seat.
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

/// Dashboard counters for the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterCounts {
    /// Students still in the rotation.
    pub active: usize,
    /// Students who have succeeded.
    pub completed: usize,
    /// Students whose refusal is spent.
    pub refusals_used: usize,
}

/// Ordered list of students with case-insensitively unique names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add students by name. Returns how many were added.
    ///
    /// Names are trimmed; blanks and case-insensitive duplicates (of the
    /// roster or of earlier names in the same batch) are skipped.
    pub fn add<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = self
            .students
            .iter()
            .map(|s| s.name.to_lowercase())
            .collect();
        let mut added = 0;
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || !seen.insert(name.to_lowercase()) {
                continue;
            }
            self.students.push(Student::new(name));
            added += 1;
        }
        info!(added, total = self.students.len(), "roster updated");
        added
    }

    /// Remove a student. Returns the removed student if found.
    pub fn remove(&mut self, id: StudentId) -> Option<Student> {
        let idx = self.students.iter().position(|s| s.id == id)?;
        let student = self.students.remove(idx);
        info!(name = %student.name, "student removed");
        Some(student)
    }

    /// Put a completed student back into the rotation.
    ///
    /// Returns true if the status changed.
    pub fn restore_to_active(&mut self, id: StudentId) -> bool {
        match self.get_mut(id) {
            Some(s) if s.status == StudentStatus::Completed => {
                s.status = StudentStatus::Active;
                true
            }
            _ => false,
        }
    }

    /// Give a student their refusal back. Returns true if the flag changed.
    pub fn reset_refusal(&mut self, id: StudentId) -> bool {
        match self.get_mut(id) {
            Some(s) if s.refusal_used => {
                s.refusal_used = false;
                true
            }
            _ => false,
        }
    }

    /// Remove every student.
    pub fn clear(&mut self) {
        self.students.clear();
    }

    /// Active students other than `exclude`, in roster order.
    pub fn eligible(&self, exclude: Option<StudentId>) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.is_active() && Some(s.id) != exclude)
            .collect()
    }

    /// Look up a student by ID.
    pub fn get(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: StudentId) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == id)
    }

    /// Find a student by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&Student> {
        let name_lower = name.trim().to_lowercase();
        self.students
            .iter()
            .find(|s| s.name.to_lowercase() == name_lower)
    }

    /// Resolve a typed name to a student, falling back to fuzzy matching.
    pub fn resolve(&self, input: &str) -> Option<&Student> {
        if let Some(student) = self.find_by_name(input) {
            return Some(student);
        }

        let input_lower = input.trim().to_lowercase();
        self.students
            .iter()
            .map(|s| (s, jaro_winkler(&input_lower, &s.name.to_lowercase())))
            .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(s, _)| s)
    }

    /// Suggest student names resembling the partial input.
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<String> {
        let partial_lower = partial.trim().to_lowercase();
        let mut suggestions: Vec<(String, f64)> = self
            .students
            .iter()
            .filter_map(|s| {
                let name_lower = s.name.to_lowercase();
                if name_lower.starts_with(&partial_lower) {
                    Some((s.name.clone(), 2.0))
                } else if name_lower.contains(&partial_lower) {
                    Some((s.name.clone(), 1.0))
                } else {
                    let score = jaro_winkler(&partial_lower, &name_lower);
                    (score >= 0.6).then(|| (s.name.clone(), score))
                }
            })
            .collect();

        suggestions.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        suggestions
            .into_iter()
            .take(limit)
            .map(|(name, _)| name)
            .collect()
    }

    /// All students, in insertion order.
    pub fn list(&self) -> &[Student] {
        &self.students
    }

    /// Trimmed, de-duplicated names in roster order.
    pub fn names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.students
            .iter()
            .map(|s| s.name.trim().to_string())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect()
    }

    /// Active, completed, and refusal-used totals.
    pub fn counts(&self) -> RosterCounts {
        RosterCounts {
            active: self.students.iter().filter(|s| s.is_active()).count(),
            completed: self.students.iter().filter(|s| !s.is_active()).count(),
            refusals_used: self.students.iter().filter(|s| s.refusal_used).count(),
        }
    }

    /// Number of students.
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
