use std::io::Write;
use std::path::Path;

use tempfile::{Builder, TempPath};

use crate::error::AppResult;

/// A uniquely named temporary text file, removed when dropped. Each
/// operation gets its own, so concurrent form edits never share a path.
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    pub fn with_lines<S: AsRef<str>>(
        prefix: &str,
        suffix: &str,
        lines: &[S],
        separator: &str,
    ) -> AppResult<Self> {
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(separator);
        Self::with_text(prefix, suffix, &text)
    }

    pub fn with_text(prefix: &str, suffix: &str, text: &str) -> AppResult<Self> {
        let mut file = Builder::new().prefix(prefix).suffix(suffix).tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        // Close the handle so the follow-up command can open the file on
        // every platform; the path still deletes itself on drop.
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
