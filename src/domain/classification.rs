#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileClassification {
    /// Inside the client root and present on disk.
    Tracked,
    /// Inside the client root but not on disk yet: an add is pending.
    PendingAdd,
    NotManaged,
    /// The workspace-info query failed; carries the CLI's error text.
    QueryFailed(String),
}

impl FileClassification {
    pub fn from_checks(in_root: bool, exists: bool) -> Self {
        match (in_root, exists) {
            (true, true) => FileClassification::Tracked,
            (true, false) => FileClassification::PendingAdd,
            (false, _) => FileClassification::NotManaged,
        }
    }

    /// Tracked or about to be: the set of files explicit commands accept.
    pub fn is_in_depot(&self) -> bool {
        matches!(
            self,
            FileClassification::Tracked | FileClassification::PendingAdd
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileClassification::Tracked => "tracked",
            FileClassification::PendingAdd => "pending-add",
            FileClassification::NotManaged => "not-managed",
            FileClassification::QueryFailed(_) => "query-failed",
        }
    }

    /// Reads back a name printed by `as_str`, as handed over between the
    /// pre-save and post-save hooks.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "tracked" => Some(FileClassification::Tracked),
            "pending-add" => Some(FileClassification::PendingAdd),
            "not-managed" => Some(FileClassification::NotManaged),
            "query-failed" => Some(FileClassification::QueryFailed(String::new())),
            _ => None,
        }
    }
}
