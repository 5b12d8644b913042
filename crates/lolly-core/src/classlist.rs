//! Saved class lists in a small JSON file.
//!
//! The store keeps named lists of student names plus the id of the list last
//! selected. Every read sanitizes what is on disk: lists without an id or a
//! name are dropped, blank student names are dropped, and a dangling
//! selection falls back to the first list.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{LollyError, LollyResult};

/// Name given to a list saved without one.
pub const UNTITLED_CLASS: &str = "Untitled class";

/// A saved class roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassList {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Student names, in order.
    #[serde(default)]
    pub students: Vec<String>,
}

/// Everything in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLists {
    /// Saved lists, in creation order.
    #[serde(default)]
    pub lists: Vec<ClassList>,
    /// The list last saved or picked.
    #[serde(default)]
    pub last_selected_id: Option<String>,
}

impl ClassList {
    /// Build a list from one raw store entry. Entries without a string id
    /// or name are rejected; non-string students are skipped.
    fn from_value(item: &Value) -> Option<Self> {
        let id = item.get("id")?.as_str()?.to_string();
        let name = item.get("name")?.as_str()?.to_string();
        let students = item
            .get("students")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Some(Self { id, name, students })
    }
}

impl ClassLists {
    /// Build the store contents from raw JSON, keeping every well-formed list.
    fn from_value(value: &Value) -> Self {
        let lists = value
            .get("lists")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(ClassList::from_value).collect())
            .unwrap_or_default();
        let last_selected_id = value
            .get("last_selected_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            lists,
            last_selected_id,
        }
        .sanitized()
    }

    /// Drop malformed entries and repair the selection.
    fn sanitized(self) -> Self {
        let lists: Vec<ClassList> = self
            .lists
            .into_iter()
            .filter(|l| !l.id.is_empty() && !l.name.is_empty())
            .map(|mut l| {
                l.students.retain(|s| !s.trim().is_empty());
                l
            })
            .collect();
        let last_selected_id = self
            .last_selected_id
            .filter(|id| lists.iter().any(|l| l.id == *id))
            .or_else(|| lists.first().map(|l| l.id.clone()));
        Self {
            lists,
            last_selected_id,
        }
    }

    /// Look up a list by id, or by name case-insensitively.
    pub fn find(&self, id_or_name: &str) -> Option<&ClassList> {
        let needle = id_or_name.trim();
        self.lists.iter().find(|l| l.id == needle).or_else(|| {
            let lower = needle.to_lowercase();
            self.lists.iter().find(|l| l.name.to_lowercase() == lower)
        })
    }
}

/// JSON-file backed class-list store.
#[derive(Debug, Clone)]
pub struct ClassListStore {
    path: PathBuf,
}

impl ClassListStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and sanitize the store.
    ///
    /// A missing file is an empty store. Malformed entries are dropped one
    /// by one. Only a file that is not JSON at all is logged and read as
    /// empty.
    pub fn read(&self) -> LollyResult<ClassLists> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ClassLists::default()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(ClassLists::from_value(&value)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "class-list store unreadable, starting empty");
                Ok(ClassLists::default())
            }
        }
    }

    /// Sanitize and persist `data`. Returns what was written.
    pub fn write(&self, data: ClassLists) -> LollyResult<ClassLists> {
        let data = data.sanitized();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&data)?)?;
        Ok(data)
    }

    /// Insert or replace a list by id and select it.
    pub fn save_list(&self, mut list: ClassList) -> LollyResult<ClassLists> {
        let mut current = self.read()?;
        list.name = match list.name.trim() {
            "" => UNTITLED_CLASS.to_string(),
            trimmed => trimmed.to_string(),
        };
        list.students.retain(|s| !s.trim().is_empty());

        info!(class = %list.name, students = list.students.len(), "class list saved");
        current.last_selected_id = Some(list.id.clone());
        match current.lists.iter_mut().find(|l| l.id == list.id) {
            Some(existing) => *existing = list,
            None => current.lists.push(list),
        }
        self.write(current)
    }

    /// Create a new list with a fresh id. Returns the saved list.
    pub fn create_list(&self, name: &str, students: Vec<String>) -> LollyResult<ClassList> {
        let id = Uuid::new_v4().to_string();
        let saved = self.save_list(ClassList {
            id: id.clone(),
            name: name.to_string(),
            students,
        })?;
        saved
            .lists
            .into_iter()
            .find(|l| l.id == id)
            .ok_or(LollyError::ClassListNotFound(id))
    }

    /// Delete a list by id. Selection moves to the first remaining list.
    pub fn delete_list(&self, id: &str) -> LollyResult<ClassLists> {
        let current = self.read()?;
        if !current.lists.iter().any(|l| l.id == id) {
            return Err(LollyError::ClassListNotFound(id.to_string()));
        }
        let lists: Vec<ClassList> = current.lists.into_iter().filter(|l| l.id != id).collect();
        let last_selected_id = lists.first().map(|l| l.id.clone());
        info!(id, "class list deleted");
        self.write(ClassLists {
            lists,
            last_selected_id,
        })
    }

    /// Select a list. Unknown ids leave the store untouched.
    pub fn set_last_selected(&self, id: &str) -> LollyResult<ClassLists> {
        let mut current = self.read()?;
        if !current.lists.iter().any(|l| l.id == id) {
            return Ok(current);
        }
        current.last_selected_id = Some(id.to_string());
        self.write(current)
    }

    /// The currently selected list, if any.
    pub fn selected_list(&self) -> LollyResult<Option<ClassList>> {
        let current = self.read()?;
        Ok(current
            .last_selected_id
            .as_deref()
            .and_then(|id| current.find(id))
            .cloned())
    }

    /// Find a list by id or name.
    pub fn find(&self, id_or_name: &str) -> LollyResult<ClassList> {
        self.read()?
            .find(id_or_name)
            .cloned()
            .ok_or_else(|| LollyError::ClassListNotFound(id_or_name.to_string()))
    }

    /// Remove every saved list.
    pub fn reset(&self) -> LollyResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "class-list store reset");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ClassListStore) {
        let dir = TempDir::new().unwrap();
        let store = ClassListStore::open(dir.path().join("classlists.json"));
        (dir, store)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_reads_empty() {
        let (_dir, s) = store();
        assert_eq!(s.read().unwrap(), ClassLists::default());
        assert!(s.selected_list().unwrap().is_none());
    }

    #[test]
    fn create_and_find() {
        let (_dir, s) = store();
        let list = s.create_list("Period 1", names(&["Ana", "Beto"])).unwrap();
        assert_eq!(list.name, "Period 1");
        assert_eq!(s.find("period 1").unwrap().id, list.id);
        assert_eq!(s.find(&list.id).unwrap().students, names(&["Ana", "Beto"]));
        assert_eq!(s.selected_list().unwrap().unwrap().id, list.id);
    }

    #[test]
    fn save_list_upserts_and_cleans() {
        let (_dir, s) = store();
        let list = s.create_list("Period 1", names(&["Ana"])).unwrap();
        s.save_list(ClassList {
            id: list.id.clone(),
            name: "   ".to_string(),
            students: names(&["Ana", " ", "Cleo"]),
        })
        .unwrap();
        let data = s.read().unwrap();
        assert_eq!(data.lists.len(), 1);
        assert_eq!(data.lists[0].name, UNTITLED_CLASS);
        assert_eq!(data.lists[0].students, names(&["Ana", "Cleo"]));
    }

    #[test]
    fn delete_moves_selection_to_first() {
        let (_dir, s) = store();
        let a = s.create_list("A", vec![]).unwrap();
        let b = s.create_list("B", vec![]).unwrap();
        assert_eq!(s.read().unwrap().last_selected_id, Some(b.id.clone()));
        let data = s.delete_list(&b.id).unwrap();
        assert_eq!(data.last_selected_id, Some(a.id.clone()));
        let data = s.delete_list(&a.id).unwrap();
        assert!(data.lists.is_empty());
        assert!(data.last_selected_id.is_none());
    }

    #[test]
    fn delete_unknown_fails() {
        let (_dir, s) = store();
        assert!(matches!(
            s.delete_list("nope"),
            Err(LollyError::ClassListNotFound(_))
        ));
    }

    #[test]
    fn set_last_selected_ignores_unknown() {
        let (_dir, s) = store();
        let a = s.create_list("A", vec![]).unwrap();
        s.create_list("B", vec![]).unwrap();
        s.set_last_selected(&a.id).unwrap();
        assert_eq!(s.read().unwrap().last_selected_id, Some(a.id.clone()));
        s.set_last_selected("ghost").unwrap();
        assert_eq!(s.read().unwrap().last_selected_id, Some(a.id));
    }

    #[test]
    fn read_sanitizes_disk_contents() {
        let (_dir, s) = store();
        fs::write(
            s.path(),
            r#"{
                "lists": [
                    {"id": "", "name": "No id", "students": []},
                    {"id": "x", "name": "", "students": []},
                    {"id": "ok", "name": "Kept", "students": ["Ana", "  "]}
                ],
                "last_selected_id": "x"
            }"#,
        )
        .unwrap();
        let data = s.read().unwrap();
        assert_eq!(data.lists.len(), 1);
        assert_eq!(data.lists[0].students, names(&["Ana"]));
        assert_eq!(data.last_selected_id.as_deref(), Some("ok"));
    }

    #[test]
    fn malformed_entry_keeps_other_lists() {
        let (_dir, s) = store();
        fs::write(
            s.path(),
            r#"{
                "lists": [
                    {"id": "good", "name": "Period 1", "students": ["Ana", "Beto"]},
                    {"id": "bad", "name": "Broken", "students": ["Cleo", null]},
                    {"id": 7, "name": "Numeric id", "students": []},
                    {"id": "noname", "students": ["Dario"]},
                    "not a list"
                ],
                "last_selected_id": "good"
            }"#,
        )
        .unwrap();

        s.create_list("Period 2", names(&["Eva"])).unwrap();

        let data = s.read().unwrap();
        let kept: Vec<&str> = data.lists.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(kept, vec!["Period 1", "Broken", "Period 2"]);
        assert_eq!(s.find("good").unwrap().students, names(&["Ana", "Beto"]));
        assert_eq!(s.find("bad").unwrap().students, names(&["Cleo"]));
    }

    #[test]
    fn non_string_selection_falls_back_to_first() {
        let (_dir, s) = store();
        fs::write(
            s.path(),
            r#"{"lists": [{"id": "a", "name": "A", "students": []}], "last_selected_id": 3}"#,
        )
        .unwrap();
        assert_eq!(s.read().unwrap().last_selected_id.as_deref(), Some("a"));
    }

    #[test]
    fn corrupt_file_reads_empty() {
        let (_dir, s) = store();
        fs::write(s.path(), "{not json").unwrap();
        assert_eq!(s.read().unwrap(), ClassLists::default());
    }

    #[test]
    fn reset_removes_file() {
        let (_dir, s) = store();
        s.create_list("A", vec![]).unwrap();
        s.reset().unwrap();
        assert!(!s.path().exists());
        s.reset().unwrap();
    }
}
