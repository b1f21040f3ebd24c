use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Result of a workspace-info query. Fetched fresh whenever needed; the
/// client workspace can change between two edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_name: String,
    pub client_root: String,
}

impl ClientInfo {
    /// The root in comparison form: host separators, lower case.
    pub fn normalized_root(&self) -> String {
        normalize_path(&self.client_root)
    }

    pub fn contains_folder(&self, folder: &Path) -> bool {
        is_under_root(&self.normalized_root(), &normalize_path(&folder.to_string_lossy()))
    }

    /// Resolves a depot-relative path (always `/`-separated) against the
    /// client root as the CLI reported it.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        let mut path = PathBuf::from(self.client_root.trim());
        for segment in relative.split(['/', '\\']).filter(|segment| !segment.is_empty()) {
            path.push(segment);
        }
        path
    }
}

pub fn normalize_path(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == '\\' || c == '/' { MAIN_SEPARATOR } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Prefix test on separator boundaries. Both arguments must already be
/// normalized.
pub fn is_under_root(normalized_root: &str, normalized_folder: &str) -> bool {
    if normalized_root.is_empty() {
        return false;
    }
    let root = normalized_root.trim_end_matches(MAIN_SEPARATOR);
    let folder = normalized_folder.trim_end_matches(MAIN_SEPARATOR);
    if folder == root {
        return true;
    }
    folder.starts_with(&format!("{root}{MAIN_SEPARATOR}"))
}
