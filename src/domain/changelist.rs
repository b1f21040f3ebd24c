use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelistId {
    Default,
    Numbered(String),
}

impl ChangelistId {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("default") {
            ChangelistId::Default
        } else {
            ChangelistId::Numbered(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChangelistId::Default => "default",
            ChangelistId::Numbered(number) => number,
        }
    }
}

impl fmt::Display for ChangelistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub display_name: String,
    pub changelist_label: String,
    pub description_summary: String,
    pub local_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelistRecord {
    pub id: ChangelistId,
    pub description: String,
    pub files: Vec<FileEntry>,
}

/// One line of `p4 changes` output:
/// `Change <n> on <date> by <user>@<client> <status> '<description>'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub number: String,
    pub description: String,
}

impl PendingChange {
    /// Splits on single spaces and reads fixed columns, so a description
    /// with runs of spaces keeps its empty tokens verbatim.
    pub fn parse_line(line: &str) -> Option<Self> {
        let tokens: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(' ').collect();
        if tokens.len() < 2 || tokens[0] != "Change" || tokens[1].is_empty() {
            return None;
        }
        let description = tokens.get(7..).map(|rest| rest.join(" ")).unwrap_or_default();
        Some(Self {
            number: tokens[1].to_string(),
            description,
        })
    }
}

/// `//depot/main/src/lib.rs#3 - edit default change (text)` becomes
/// `main/src/lib.rs`: the revision suffix goes, as do the first three
/// `/`-separated segments.
pub fn depot_relative_path(opened_line: &str) -> Option<String> {
    let without_revision = match opened_line.rfind('#') {
        Some(index) => &opened_line[..index],
        None => opened_line,
    };
    let relative = without_revision
        .split('/')
        .skip(3)
        .collect::<Vec<_>>()
        .join("/");
    if relative.trim().is_empty() {
        None
    } else {
        Some(relative)
    }
}

/// Reads the number out of `Change 1234 created.`.
pub fn created_changelist_number(confirmation: &str) -> Option<String> {
    let line = confirmation.lines().find(|line| line.starts_with("Change "))?;
    let number = line.split(' ').nth(1)?;
    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
        Some(number.to_string())
    } else {
        None
    }
}
