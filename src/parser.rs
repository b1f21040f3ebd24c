//! Label-anchored scanning of the CLI's human-formatted output.
//!
//! The CLI prints stable English labels (`User name: `, `Description:`,
//! `Files:`) rather than a machine format. Everything that depends on that
//! layout lives here so a switch to tagged output only touches this module.

pub const USER_NAME_LABEL: &str = "User name: ";
pub const CLIENT_ROOT_LABEL: &str = "Client root: ";
pub const DESCRIPTION_SECTION: &str = "Description:";
pub const FILES_SECTION: &str = "Files:";
pub const DESCRIPTION_PLACEHOLDER: &str = "<enter description here>";

/// Line range of a form section. `start` is the header line; `end` is one
/// past the last content line, trailing blank lines excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    pub start: usize,
    pub end: usize,
}

/// Value following the first occurrence of `label`, up to the next line
/// break, trimmed. Output cut off before the line break counts as missing.
pub fn extract_field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    let end = rest.find('\n')?;
    Some(rest[..end].trim())
}

/// Index of the first line whose trimmed content is exactly `label`.
pub fn find_line(lines: &[&str], label: &str) -> Option<usize> {
    lines.iter().position(|line| line.trim() == label)
}

pub fn find_section_bounds(text: &str, section_label: &str) -> Option<SectionBounds> {
    let lines: Vec<&str> = text.lines().collect();
    section_bounds_in(&lines, section_label)
}

/// Section content is every following line that is indented or blank;
/// the first flush-left line opens the next field.
pub fn section_bounds_in(lines: &[&str], section_label: &str) -> Option<SectionBounds> {
    let start = find_line(lines, section_label)?;
    let mut end = start + 1;
    for (index, line) in lines.iter().enumerate().skip(start + 1) {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with([' ', '\t']) {
            end = index + 1;
        } else {
            break;
        }
    }
    Some(SectionBounds { start, end })
}
