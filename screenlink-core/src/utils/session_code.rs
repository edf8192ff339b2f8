use super::{
    SESSION_CODE_CHARSET, SESSION_CODE_SEGMENT_LENGTH, SESSION_CODE_SEGMENTS,
    SESSION_CODE_SEPARATOR,
};
use rand::Rng;

/// Random code in `ABC-DEF-GHI` form, every character drawn uniformly from the charset.
pub fn generate_session_code() -> String {
    let charset = SESSION_CODE_CHARSET.as_bytes();
    let mut rng = rand::thread_rng();

    let segments: Vec<String> = (0..SESSION_CODE_SEGMENTS)
        .map(|_| {
            (0..SESSION_CODE_SEGMENT_LENGTH)
                .map(|_| charset[rng.gen_range(0..charset.len())] as char)
                .collect()
        })
        .collect();

    segments.join(&SESSION_CODE_SEPARATOR.to_string())
}

/// Case-insensitive format check.
pub fn is_valid_session_code(code: &str) -> bool {
    let upper = code.to_ascii_uppercase();
    let segments: Vec<&str> = upper.split(SESSION_CODE_SEPARATOR).collect();

    segments.len() == SESSION_CODE_SEGMENTS
        && segments.iter().all(|segment| {
            segment.len() == SESSION_CODE_SEGMENT_LENGTH
                && segment.chars().all(|c| SESSION_CODE_CHARSET.contains(c))
        })
}

/// Normalizes user input for display: `abcdefghi` and `abc-def-ghi` both become `ABC-DEF-GHI`.
pub fn format_session_code(input: &str) -> String {
    let clean: Vec<char> = input
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    clean
        .chunks(SESSION_CODE_SEGMENT_LENGTH)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(&SESSION_CODE_SEPARATOR.to_string())
}
