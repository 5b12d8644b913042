use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use lolly_core::import::read_roster;
use lolly_core::{ClassListStore, LollyError};

pub fn list(store: &Path) -> Result<(), String> {
    let data = ClassListStore::open(store).read().map_err(|e| e.to_string())?;

    if data.lists.is_empty() {
        println!("  No saved class lists.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Students", "Selected"]);

    for list in &data.lists {
        let selected = if data.last_selected_id.as_deref() == Some(list.id.as_str()) {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            list.name.clone(),
            list.students.len().to_string(),
            selected.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} class lists", data.lists.len());

    Ok(())
}

pub fn show(store: &Path, name: &str) -> Result<(), String> {
    let list = ClassListStore::open(store)
        .find(name)
        .map_err(|e| e.to_string())?;

    println!("  {} ({} students)", list.name.bold(), list.students.len());
    if list.students.is_empty() {
        println!("  —");
    }
    for (i, student) in list.students.iter().enumerate() {
        println!("  {:>3}. {student}", i + 1);
    }

    Ok(())
}

pub fn create(
    store: &Path,
    name: &str,
    mut students: Vec<String>,
    file: Option<&Path>,
) -> Result<(), String> {
    if let Some(path) = file {
        students.extend(read_roster(path).map_err(|e| e.to_string())?);
    }

    let store = ClassListStore::open(store);
    match store.find(name) {
        Ok(_) => return Err(format!("class list '{name}' already exists")),
        Err(LollyError::ClassListNotFound(_)) => {}
        Err(e) => return Err(e.to_string()),
    }

    let list = store
        .create_list(name, dedupe(students))
        .map_err(|e| e.to_string())?;
    println!(
        "Created class list '{}' with {} students",
        list.name,
        list.students.len()
    );

    Ok(())
}

pub fn delete(store: &Path, name: &str) -> Result<(), String> {
    let store = ClassListStore::open(store);
    let list = store.find(name).map_err(|e| e.to_string())?;
    store.delete_list(&list.id).map_err(|e| e.to_string())?;
    println!("Deleted class list '{}'", list.name);
    Ok(())
}

pub fn reset(store: &Path) -> Result<(), String> {
    ClassListStore::open(store)
        .reset()
        .map_err(|e| e.to_string())?;
    println!("All class lists removed.");
    Ok(())
}

/// Trim and drop blank or repeated names (case-insensitive), keeping first occurrences.
fn dedupe(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.to_lowercase()))
        .collect()
}
