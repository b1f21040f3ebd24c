//! Line-level edits of changelist forms (`p4 change -o` output).

use crate::error::{AppError, AppResult};
use crate::parser::{
    DESCRIPTION_PLACEHOLDER, DESCRIPTION_SECTION, FILES_SECTION, find_line,
    find_section_bounds,
};

/// Fills the blank-changelist template with `description` and drops the
/// `Files:` section, which only lists what is pending in the default
/// changelist. A new changelist must not claim those files.
pub fn new_changelist_form(template: &str, description: &str) -> AppResult<Vec<String>> {
    if !template.contains(DESCRIPTION_PLACEHOLDER) {
        return Err(AppError::unexpected("p4 change -o", "description placeholder"));
    }

    let indented = description.lines().collect::<Vec<_>>().join("\n\t");
    let filled = template.replace(DESCRIPTION_PLACEHOLDER, indented.trim());

    let mut lines: Vec<String> = filled.lines().map(str::to_string).collect();
    // The comment header mentions "Files:" mid-line; only a whole line opens
    // the section, and the real one is always last.
    if let Some(files) = lines.iter().rposition(|line| line.trim() == FILES_SECTION) {
        lines.truncate(files);
    }
    Ok(lines)
}

/// Inserts `\t<line>` as the last line of the description: just before the
/// blank line that separates it from `Files:`, or at the end of the
/// description section when the changelist has no files.
pub fn append_description_line(form: &str, line: &str) -> AppResult<Vec<String>> {
    let lines: Vec<&str> = form.lines().collect();
    let description = find_section_bounds(form, DESCRIPTION_SECTION)
        .ok_or_else(|| AppError::unexpected("p4 change -o", "Description section"))?;

    let insert_at = match find_line(&lines, FILES_SECTION) {
        Some(files) if files > description.start => {
            if files > 0 && lines[files - 1].trim().is_empty() {
                files - 1
            } else {
                files
            }
        }
        _ => description.end,
    };

    let mut edited: Vec<String> = lines.iter().map(|line| line.to_string()).collect();
    edited.insert(insert_at, format!("\t{line}"));
    Ok(edited)
}
