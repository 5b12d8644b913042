//! Line-oriented session over a [`RoundController`].
//!
//! `LollySession` turns typed commands (`add`, `pick`, `refuse`, `win`, ...)
//! into controller calls and returns the text to show. It also bridges the
//! roster to the saved class-list store.

use std::path::Path;

use tracing::debug;

use crate::classlist::ClassListStore;
use crate::config::SessionConfig;
use crate::controller::RoundController;
use crate::error::{LollyError, LollyResult};
use crate::history::History;
use crate::import::{parse_names, read_roster};
use crate::random::{RandomSource, StdRandom};
use crate::roster::StudentId;
use crate::round::{Role, Winner};

/// An interactive Lollypop session.
pub struct LollySession<R = StdRandom> {
    controller: RoundController<R>,
    store: Option<ClassListStore>,
}

impl LollySession<StdRandom> {
    /// Create a session from a configuration.
    pub fn new(config: SessionConfig) -> Self {
        let rng = StdRandom::from_seed(config.seed);
        Self::with_source(config, rng)
    }
}

impl<R: RandomSource> LollySession<R> {
    /// Create a session drawing picks from `rng`.
    pub fn with_source(config: SessionConfig, rng: R) -> Self {
        Self {
            controller: RoundController::new(rng),
            store: config.class_store.map(ClassListStore::open),
        }
    }

    /// The underlying controller.
    pub fn controller(&self) -> &RoundController<R> {
        &self.controller
    }

    /// The class-list store, if configured.
    pub fn store(&self) -> Option<&ClassListStore> {
        self.store.as_ref()
    }

    /// Process a line of user input and return a response.
    pub fn process(&mut self, input: &str) -> LollyResult<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }

        let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
        let cmd = parts[0].to_lowercase();
        let rest = parts.get(1).map(|s| s.trim()).unwrap_or("");
        debug!(%cmd, "processing command");

        match cmd.as_str() {
            "add" => self.do_add(rest),
            "import" => self.do_import(rest),
            "remove" | "rm" => self.do_remove(rest),
            "restore" => self.do_restore(rest),
            "reset-refusal" => self.do_reset_refusal(rest),
            "pick" => self.do_pick(rest),
            "refuse" => self.do_refuse(rest),
            "win" => self.do_win(rest),
            "reset" => {
                self.controller.reset_round();
                Ok("Round reset. Start by selecting a responder.".to_string())
            }
            "roster" => Ok(self.do_roster()),
            "round" => Ok(self.do_round()),
            "history" => Ok(self.do_history()),
            "status" => Ok(self.do_status()),
            "clear" => self.do_clear(rest),
            "classes" => self.do_classes(),
            "load" => self.do_load(rest),
            "save" => self.do_save(rest),
            "export" => self.do_export(rest),
            "help" => Ok(help(rest)),
            "quit" | "q" => Ok("Goodbye!".to_string()),
            other => Err(LollyError::UnknownCommand(other.to_string())),
        }
    }

    fn do_add(&mut self, rest: &str) -> LollyResult<String> {
        let names = parse_names(rest);
        if names.is_empty() {
            return Err(LollyError::NoNames);
        }
        Ok(added_message(self.controller.add_students(&names)))
    }

    fn do_import(&mut self, rest: &str) -> LollyResult<String> {
        if rest.is_empty() {
            return Err(LollyError::InvalidChoice("usage: import <file>".to_string()));
        }
        let names = read_roster(Path::new(rest))?;
        Ok(added_message(self.controller.add_students(&names)))
    }

    fn do_remove(&mut self, name: &str) -> LollyResult<String> {
        let id = self.find_student(name, "remove", false)?;
        match self.controller.remove_student(id) {
            Some(s) => Ok(format!("Removed {}.", s.name)),
            None => Err(LollyError::StudentNotFound(name.to_string())),
        }
    }

    fn do_restore(&mut self, name: &str) -> LollyResult<String> {
        let id = self.find_student(name, "restore", true)?;
        let student = self.student_name(id);
        if self.controller.restore_to_active(id) {
            Ok(format!("{student} returns to the rotation."))
        } else {
            Ok(format!("{student} is already active."))
        }
    }

    fn do_reset_refusal(&mut self, name: &str) -> LollyResult<String> {
        let id = self.find_student(name, "reset-refusal", true)?;
        let student = self.student_name(id);
        if self.controller.reset_refusal(id) {
            Ok(format!("{student}'s refusal has been reset."))
        } else {
            Ok(format!("{student} has not used their refusal."))
        }
    }

    fn do_pick(&mut self, rest: &str) -> LollyResult<String> {
        let role = if rest.is_empty() {
            match self.controller.round().responder() {
                None => Role::Responder,
                Some(_) => Role::Questioner,
            }
        } else {
            parse_role(rest, "pick")?
        };
        Ok(self.controller.select_random(role).to_string())
    }

    fn do_refuse(&mut self, rest: &str) -> LollyResult<String> {
        let role = parse_role(rest, "refuse")?;
        Ok(self.controller.refuse(role).to_string())
    }

    fn do_win(&mut self, rest: &str) -> LollyResult<String> {
        let winner = Winner::parse(rest).ok_or_else(|| {
            LollyError::InvalidChoice("usage: win responder|questioner|none".to_string())
        })?;
        Ok(self.controller.resolve(winner).to_string())
    }

    fn do_roster(&self) -> String {
        let roster = self.controller.roster();
        if roster.is_empty() {
            return "Roster is empty. Add students with 'add <names>'.".to_string();
        }
        let mut out = format!("Roster ({}):\n", roster.len());
        for (i, s) in roster.list().iter().enumerate() {
            out.push_str(&format!("  {}. {} [{}]", i + 1, s.name, s.status));
            if s.refusal_used {
                out.push_str(" (refusal used)");
            }
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    fn do_round(&self) -> String {
        let mut out = String::new();
        for role in [Role::Responder, Role::Questioner] {
            let line = match self.controller.seated(role) {
                Some(s) if s.refusal_used => format!("{} (refusal already used)", s.name),
                Some(s) => format!("{} (refusal available)", s.name),
                None if self.controller.can_select(role) => "Not selected".to_string(),
                None if role == Role::Questioner && self.controller.round().responder().is_none() => {
                    "Not selected (pick a responder first)".to_string()
                }
                None => "Not selected (no eligible students)".to_string(),
            };
            let label = match role {
                Role::Responder => "Responder",
                Role::Questioner => "Questioner",
            };
            out.push_str(&format!("{label}: {line}\n"));
        }
        if self.controller.round().is_ready() {
            out.push_str("Ready: win responder|questioner|none");
        } else {
            out.push_str("Awaiting selections.");
        }
        out
    }

    fn do_history(&self) -> String {
        let history = self.controller.history();
        if history.is_empty() {
            return "No rounds recorded yet.".to_string();
        }
        let mut out = format!("History ({} rounds, newest first):\n", history.len());
        for entry in history.entries() {
            out.push_str(&format!(
                "  {}\n",
                History::describe(entry, self.controller.roster())
            ));
        }
        out.trim_end().to_string()
    }

    fn do_status(&self) -> String {
        let counts = self.controller.roster().counts();
        format!(
            "Active: {}\nComplete: {}\nRefusals used: {}\nRounds: {}",
            counts.active,
            counts.completed,
            counts.refusals_used,
            self.controller.history().len()
        )
    }

    fn do_clear(&mut self, rest: &str) -> LollyResult<String> {
        match rest.to_lowercase().as_str() {
            "" | "roster" => {
                self.controller.clear_roster();
                Ok("Roster cleared.".to_string())
            }
            "history" => {
                self.controller.clear_history();
                Ok("History cleared.".to_string())
            }
            other => Err(LollyError::InvalidChoice(format!(
                "unknown target '{other}', use: clear [roster|history]"
            ))),
        }
    }

    fn do_classes(&self) -> LollyResult<String> {
        let data = self.require_store()?.read()?;
        if data.lists.is_empty() {
            return Ok("No saved class lists.".to_string());
        }
        let mut out = format!("Saved class lists ({}):\n", data.lists.len());
        for (i, list) in data.lists.iter().enumerate() {
            let marker = if data.last_selected_id.as_deref() == Some(list.id.as_str()) {
                "*"
            } else {
                " "
            };
            out.push_str(&format!(
                " {marker}{}. {} ({})\n",
                i + 1,
                list.name,
                list.students.len()
            ));
        }
        Ok(out.trim_end().to_string())
    }

    fn do_load(&mut self, rest: &str) -> LollyResult<String> {
        if rest.is_empty() {
            return Err(LollyError::InvalidChoice("usage: load <class>".to_string()));
        }
        let store = self.require_store()?;
        let list = store.find(rest)?;
        store.set_last_selected(&list.id)?;
        let loaded = self.controller.load_class_list(&list);
        Ok(format!(
            "Loaded {loaded} {} from \"{}\".",
            plural(loaded, "student", "students"),
            list.name
        ))
    }

    fn do_save(&mut self, rest: &str) -> LollyResult<String> {
        if rest.is_empty() {
            return Err(LollyError::InvalidChoice("usage: save <class>".to_string()));
        }
        let names = self.controller.roster().names();
        let count = names.len();
        let store = self.require_store()?;
        let name = match store.find(rest) {
            Ok(mut existing) => {
                existing.students = names;
                let name = existing.name.clone();
                store.save_list(existing)?;
                name
            }
            Err(LollyError::ClassListNotFound(_)) => store.create_list(rest, names)?.name,
            Err(e) => return Err(e),
        };
        Ok(format!(
            "Saved {count} {} to \"{name}\".",
            plural(count, "name", "names")
        ))
    }

    fn do_export(&self, format: &str) -> LollyResult<String> {
        let roster = self.controller.roster();
        let history = self.controller.history();
        match format.to_lowercase().as_str() {
            "markdown" | "md" | "" => Ok(history.export_markdown(roster)),
            "text" | "txt" => Ok(history.export_text(roster)),
            other => Err(LollyError::InvalidChoice(format!(
                "unknown format '{other}', use: markdown, text"
            ))),
        }
    }

    /// Look up a student for a command. Destructive commands pass
    /// `fuzzy = false` and only accept an exact (case-insensitive) name.
    fn find_student(&self, name: &str, usage: &str, fuzzy: bool) -> LollyResult<StudentId> {
        if name.is_empty() {
            return Err(LollyError::InvalidChoice(format!("usage: {usage} <name>")));
        }
        let roster = self.controller.roster();
        let found = if fuzzy {
            roster.resolve(name)
        } else {
            roster.find_by_name(name)
        };
        if let Some(s) = found {
            return Ok(s.id);
        }
        let suggestions = roster.suggest(name, 3);
        if suggestions.is_empty() {
            Err(LollyError::StudentNotFound(name.to_string()))
        } else {
            Err(LollyError::StudentNotFound(format!(
                "{name} (did you mean: {}?)",
                suggestions.join(", ")
            )))
        }
    }

    fn student_name(&self, id: StudentId) -> String {
        self.controller
            .roster()
            .get(id)
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    fn require_store(&self) -> LollyResult<&ClassListStore> {
        self.store.as_ref().ok_or(LollyError::NoClassStore)
    }
}

fn parse_role(input: &str, usage: &str) -> LollyResult<Role> {
    Role::parse(input).ok_or_else(|| {
        LollyError::InvalidChoice(format!("usage: {usage} responder|questioner"))
    })
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

fn added_message(added: usize) -> String {
    if added == 0 {
        "All of those names were already listed.".to_string()
    } else {
        format!("Added {added} {}.", plural(added, "student", "students"))
    }
}

fn help(topic: &str) -> String {
    match topic.to_lowercase().as_str() {
        "roster" | "students" => "\
Roster Commands:
  add <names>                   Add comma or newline separated names
  import <file>                 Add names from a text or CSV file
  remove <name>                 Remove a student
  restore <name>                Return a completed student to the rotation
  reset-refusal <name>          Give a student their refusal back
  roster                        List students
  clear [roster|history]        Clear the roster (and round, history) or history"
            .to_string(),
        "round" | "rounds" => "\
Round Commands:
  pick [responder|questioner]   Pick a random student for a seat
  refuse responder|questioner   Use the seated student's one refusal
  win responder|questioner|none Record the outcome and start over
  reset                         Abandon the round without recording
  round                         Show the current seats"
            .to_string(),
        "classes" | "class" => "\
Class List Commands:
  classes                       List saved class lists
  load <class>                  Replace the roster with a saved list
  save <class>                  Save the roster into a class list"
            .to_string(),
        _ => "\
Lollypop Commands:
  add <names>                   Add students
  import <file>                 Import a roster file
  remove|restore|reset-refusal  Edit a student
  roster                        List students
  pick [role]                   Pick a responder, then a questioner
  refuse <role>                 Use a refusal and pick a replacement
  win <role|none>               Record the round
  reset                         Abandon the round
  round                         Show the current seats
  history                       Show recorded rounds
  status                        Show counts
  classes | load | save         Manage saved class lists
  export [markdown|text]        Export the history
  clear [roster|history]        Clear state
  help [topic]                  Show help (roster, round, classes)
  quit                          Exit"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::Scripted;
    use crate::roster::StudentStatus;
    use std::fs;
    use tempfile::TempDir;

    fn session(picks: &[usize]) -> LollySession<Scripted> {
        LollySession::with_source(SessionConfig::default(), Scripted::new(picks))
    }

    fn session_with_store(dir: &TempDir) -> LollySession<Scripted> {
        let config = SessionConfig::default().with_class_store(dir.path().join("classes.json"));
        LollySession::with_source(config, Scripted::new(&[]))
    }

    #[test]
    fn empty_input() {
        let mut s = session(&[]);
        assert!(s.process("   ").unwrap().is_empty());
    }

    #[test]
    fn add_reports_counts() {
        let mut s = session(&[]);
        assert_eq!(s.process("add Ana, Beto").unwrap(), "Added 2 students.");
        assert_eq!(s.process("add Cleo").unwrap(), "Added 1 student.");
        assert_eq!(
            s.process("add ana").unwrap(),
            "All of those names were already listed."
        );
        assert!(matches!(s.process("add  , "), Err(LollyError::NoNames)));
    }

    #[test]
    fn import_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.csv");
        fs::write(&path, "Ana\nBeto,Cleo\n").unwrap();
        let mut s = session(&[]);
        let out = s.process(&format!("import {}", path.display())).unwrap();
        assert_eq!(out, "Added 3 students.");
    }

    #[test]
    fn import_failure_leaves_roster() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&[]);
        s.process("add Ana").unwrap();
        let missing = dir.path().join("missing.csv");
        assert!(s.process(&format!("import {}", missing.display())).is_err());
        assert_eq!(s.controller().roster().len(), 1);
    }

    #[test]
    fn full_round() {
        let mut s = session(&[0, 0]);
        s.process("add Ana, Beto").unwrap();
        assert_eq!(s.process("pick").unwrap(), "Ana selected as responder.");
        assert_eq!(s.process("pick").unwrap(), "Beto selected as questioner.");
        assert!(s.process("round").unwrap().contains("Ready"));
        let out = s.process("win responder").unwrap();
        assert!(out.contains("Ana succeeded and leaves the rotation"));
        let history = s.process("history").unwrap();
        assert!(history.contains("Ana ↔ Beto • Ana succeeded"));
        let status = s.process("status").unwrap();
        assert!(status.contains("Active: 1"));
        assert!(status.contains("Complete: 1"));
        assert!(status.contains("Rounds: 1"));
    }

    #[test]
    fn refuse_flow() {
        let mut s = session(&[0, 0]);
        s.process("add Ana, Beto, Cleo").unwrap();
        s.process("pick responder").unwrap();
        let out = s.process("refuse responder").unwrap();
        assert!(out.contains("Ana used their one refusal"));
        assert!(out.contains("Beto selected as responder."));
        assert!(s.process("roster").unwrap().contains("Ana [Active] (refusal used)"));
        assert_eq!(
            s.process("reset-refusal ana").unwrap(),
            "Ana's refusal has been reset."
        );
    }

    #[test]
    fn single_student_cannot_pair() {
        let mut s = session(&[]);
        s.process("add Ana").unwrap();
        let out = s.process("pick").unwrap();
        assert!(out.contains("Need another active student"));
        assert!(
            s.process("pick questioner")
                .unwrap()
                .contains("No eligible students available")
        );
        assert!(
            s.process("round")
                .unwrap()
                .contains("Questioner: Not selected (no eligible students)")
        );
    }

    #[test]
    fn win_without_round_resets() {
        let mut s = session(&[]);
        s.process("add Ana, Beto").unwrap();
        let out = s.process("win none").unwrap();
        assert!(out.contains("Round reset"));
        assert!(s.controller().history().is_empty());
    }

    #[test]
    fn remove_and_restore() {
        let mut s = session(&[0, 0]);
        s.process("add Ana, Beto, Cleo").unwrap();
        s.process("pick").unwrap();
        s.process("pick").unwrap();
        s.process("win questioner").unwrap();
        assert_eq!(
            s.controller().roster().find_by_name("Beto").unwrap().status,
            StudentStatus::Completed
        );
        assert_eq!(s.process("restore beto").unwrap(), "Beto returns to the rotation.");
        assert_eq!(s.process("restore beto").unwrap(), "Beto is already active.");
        assert_eq!(s.process("remove Cleo").unwrap(), "Removed Cleo.");
        assert_eq!(s.controller().roster().len(), 2);
    }

    #[test]
    fn remove_needs_exact_name() {
        let mut s = session(&[0]);
        s.process("add Betty, Ana").unwrap();
        s.process("pick").unwrap();

        let err = s.process("remove Beto").unwrap_err();
        assert!(matches!(err, LollyError::StudentNotFound(_)));
        assert!(err.to_string().contains("did you mean: Betty"));
        assert_eq!(s.controller().roster().len(), 2);
        assert!(s.controller().round().responder().is_some());

        assert_eq!(s.process("remove BETTY").unwrap(), "Removed Betty.");
        assert_eq!(s.controller().roster().len(), 1);
    }

    #[test]
    fn restore_accepts_close_names() {
        let mut s = session(&[0, 0]);
        s.process("add Beatriz, Ana").unwrap();
        s.process("pick").unwrap();
        s.process("pick").unwrap();
        s.process("win responder").unwrap();
        assert_eq!(
            s.process("restore Beatris").unwrap(),
            "Beatriz returns to the rotation."
        );
    }

    #[test]
    fn unknown_student_suggests() {
        let mut s = session(&[]);
        s.process("add Beatriz").unwrap();
        let err = s.process("remove triz").unwrap_err();
        assert!(err.to_string().contains("did you mean: Beatriz"));
    }

    #[test]
    fn bad_usage() {
        let mut s = session(&[]);
        assert!(s.process("refuse").is_err());
        assert!(s.process("win maybe").is_err());
        assert!(s.process("clear everything").is_err());
        assert!(matches!(
            s.process("dance"),
            Err(LollyError::UnknownCommand(_))
        ));
    }

    #[test]
    fn clear_commands() {
        let mut s = session(&[0, 0]);
        s.process("add Ana, Beto").unwrap();
        s.process("pick").unwrap();
        s.process("pick").unwrap();
        s.process("win none").unwrap();
        assert_eq!(s.process("clear history").unwrap(), "History cleared.");
        assert!(s.controller().history().is_empty());
        assert_eq!(s.controller().roster().len(), 2);
        assert_eq!(s.process("clear").unwrap(), "Roster cleared.");
        assert!(s.controller().roster().is_empty());
    }

    #[test]
    fn export_formats() {
        let mut s = session(&[0, 0]);
        s.process("add Ana, Beto").unwrap();
        s.process("pick").unwrap();
        s.process("pick").unwrap();
        s.process("win none").unwrap();
        assert!(s.process("export").unwrap().starts_with("# Lollypop Round History"));
        assert!(s.process("export text").unwrap().contains("Ana ↔ Beto • No winner"));
        assert!(s.process("export pdf").is_err());
    }

    #[test]
    fn classes_need_store() {
        let mut s = session(&[]);
        assert!(matches!(s.process("classes"), Err(LollyError::NoClassStore)));
    }

    #[test]
    fn save_and_load_class() {
        let dir = TempDir::new().unwrap();
        let mut s = session_with_store(&dir);
        assert_eq!(s.process("classes").unwrap(), "No saved class lists.");
        s.process("add Ana, Beto").unwrap();
        assert_eq!(
            s.process("save Period 1").unwrap(),
            "Saved 2 names to \"Period 1\"."
        );
        assert!(s.process("classes").unwrap().contains("*1. Period 1 (2)"));

        s.process("clear").unwrap();
        s.process("add Zed").unwrap();
        assert_eq!(
            s.process("load period 1").unwrap(),
            "Loaded 2 students from \"Period 1\"."
        );
        assert!(s.controller().roster().find_by_name("Zed").is_none());

        s.process("add Cleo").unwrap();
        assert_eq!(
            s.process("save Period 1").unwrap(),
            "Saved 3 names to \"Period 1\"."
        );
        let stored = s.store().unwrap().find("Period 1").unwrap();
        assert_eq!(stored.students, vec!["Ana", "Beto", "Cleo"]);
    }

    #[test]
    fn load_unknown_class() {
        let dir = TempDir::new().unwrap();
        let mut s = session_with_store(&dir);
        assert!(matches!(
            s.process("load Ghosts"),
            Err(LollyError::ClassListNotFound(_))
        ));
    }

    #[test]
    fn help_topics() {
        let mut s = session(&[]);
        assert!(s.process("help").unwrap().contains("Lollypop Commands"));
        assert!(s.process("help round").unwrap().contains("refuse"));
        assert!(s.process("help classes").unwrap().contains("load <class>"));
    }

    #[test]
    fn quit() {
        let mut s = session(&[]);
        assert_eq!(s.process("quit").unwrap(), "Goodbye!");
    }

    #[test]
    fn seeded_session_from_config() {
        let mut s = LollySession::new(SessionConfig::default().with_seed(5));
        s.process("add Ana, Beto").unwrap();
        assert!(s.process("pick").unwrap().contains("selected as responder"));
    }
}
