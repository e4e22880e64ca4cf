/// Storage keys become file names, so they are limited to ASCII letters,
/// digits, `-`, `_` and `.`, and may not start with a dot
pub fn is_valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
