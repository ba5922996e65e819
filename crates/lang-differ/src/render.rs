//! Change computation and rendering.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::{extract_strings, StringTable};
use crate::mode::DiffMode;
use crate::Result;

/// A single change to the string table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StringChange {
    Added { key: String, value: String },
    Removed { key: String, value: String },
    Changed { key: String, old: String, new: String },
}

impl StringChange {
    pub fn key(&self) -> &str {
        match self {
            StringChange::Added { key, .. }
            | StringChange::Removed { key, .. }
            | StringChange::Changed { key, .. } => key,
        }
    }
}

/// All changes between two string tables, in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringDiff {
    pub changes: Vec<StringChange>,
}

impl StringDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn added(&self) -> impl Iterator<Item = &StringChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, StringChange::Added { .. }))
    }

    pub fn removed(&self) -> impl Iterator<Item = &StringChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, StringChange::Removed { .. }))
    }

    pub fn changed(&self) -> impl Iterator<Item = &StringChange> {
        self.changes
            .iter()
            .filter(|c| matches!(c, StringChange::Changed { .. }))
    }

    /// Render grouped `# Added` / `# Removed` / `# Changed` sections.
    /// Empty groups are left out.
    pub fn render(&self, mode: DiffMode) -> String {
        let mut sections = Vec::new();

        let added: Vec<String> = self
            .added()
            .filter_map(|c| match c {
                StringChange::Added { key, value } => Some(line('+', key, value)),
                _ => None,
            })
            .collect();
        if !added.is_empty() {
            sections.push(format!("# Added\n{}", added.join("\n")));
        }

        let removed: Vec<String> = self
            .removed()
            .filter_map(|c| match c {
                StringChange::Removed { key, value } => Some(line('-', key, value)),
                _ => None,
            })
            .collect();
        if !removed.is_empty() {
            sections.push(format!("# Removed\n{}", removed.join("\n")));
        }

        let changed: Vec<String> = self
            .changed()
            .filter_map(|c| match c {
                StringChange::Changed { key, old, new } => {
                    Some(format!("{}\n{}", line('-', key, old), line('+', key, new)))
                }
                _ => None,
            })
            .collect();
        if !changed.is_empty() {
            sections.push(format!("# Changed\n{}", changed.join("\n")));
        }

        let body = sections.join("\n\n");
        match mode {
            DiffMode::Plain => body,
            DiffMode::Codeblock => {
                let fence = "`".repeat(longest_backtick_run(&body).max(2) + 1);
                format!("{fence}diff\n{body}\n{fence}")
            }
        }
    }
}

fn line(sign: char, key: &str, value: &str) -> String {
    // serde_json gives a double-quoted, escaped rendering of the value
    let quoted = serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"));
    format!("{sign} {key}: {quoted}")
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Compare two string tables.
pub fn compute_changes(old: &StringTable, new: &StringTable) -> StringDiff {
    let mut changes = Vec::new();

    for (key, new_value) in new {
        match old.get(key) {
            None => changes.push(StringChange::Added {
                key: key.clone(),
                value: new_value.clone(),
            }),
            Some(old_value) if old_value != new_value => changes.push(StringChange::Changed {
                key: key.clone(),
                old: old_value.clone(),
                new: new_value.clone(),
            }),
            Some(_) => {}
        }
    }

    for (key, old_value) in old {
        if !new.contains_key(key) {
            changes.push(StringChange::Removed {
                key: key.clone(),
                value: old_value.clone(),
            });
        }
    }

    changes.sort_by(|a, b| a.key().cmp(b.key()));
    StringDiff { changes }
}

/// Diff the string tables of two bundle sources and render the result.
///
/// Returns `Ok(None)` when no string was added, removed or changed.
pub fn diff(old: &str, new: &str, mode: DiffMode) -> Result<Option<String>> {
    if old == new {
        return Ok(None);
    }

    let old_table = extract_strings(old)?;
    let new_table = extract_strings(new)?;
    debug!(
        old_strings = old_table.len(),
        new_strings = new_table.len(),
        "extracted string tables"
    );

    let changes = compute_changes(&old_table, &new_table);
    if changes.is_empty() {
        return Ok(None);
    }
    Ok(Some(changes.render(mode)))
}
