/// Value returned when a raw field cannot be resolved to a user handle.
pub const SENTINEL: &str = "NAN";

const MAX_HANDLE_LEN: usize = 15;

/// Maps a raw CSV field to a canonical handle, or to [`SENTINEL`].
///
/// Surrounding whitespace and quotes are dropped, one leading `@` is
/// stripped and the result is lowercased. A handle must be 1 to 15
/// ASCII alphanumerics or underscores.
pub fn clean_user_name(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);

    let valid = !handle.is_empty()
        && handle.len() <= MAX_HANDLE_LEN
        && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        handle.to_ascii_lowercase()
    } else {
        SENTINEL.to_string()
    }
}
