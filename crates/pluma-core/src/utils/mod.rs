//! Small path and naming helpers shared across the crate.

/// Validates a category folder name:
/// - no directory separators (no subfolders)
/// - only letters, digits, underscores, and hyphens
pub fn validate_category_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
