/// Tag text helpers for the "Edit Tags" dialog

/// Tags assigned to every freshly added model
pub const DEFAULT_TAGS: &[&str] = &["default"];

/// Split user input on commas, trimming whitespace and dropping empty entries
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render tags back into the text the dialog starts with
pub fn format_tags(tags: &[String]) -> String {
    tags.join(", ")
}

pub fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|t| t.to_string()).collect()
}
