use once_cell::sync::Lazy;
use regex::Regex;

/// Longest filename (in characters) produced by [`sanitize_filename`].
pub const MAX_FILENAME_LEN: usize = 200;

static DISALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s.-]").expect("disallowed chars regex should compile"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Reduce an arbitrary title to something safe inside a `Content-Disposition`
/// header: only word characters, `.` and `-` survive, whitespace runs become a
/// single `_`, and the result is capped at [`MAX_FILENAME_LEN`].
pub fn sanitize_filename(name: &str) -> String {
    let kept = DISALLOWED_CHARS.replace_all(name, "");
    let joined = WHITESPACE_RUN.replace_all(&kept, "_");
    joined.chars().take(MAX_FILENAME_LEN).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_disallowed_characters() {
        assert_eq!(sanitize_filename(r#"Rick "Astley" / Never?"#), "Rick_Astley_Never");
        assert_eq!(sanitize_filename("a<b>c|d:e*f"), "abcdef");
    }

    #[test]
    fn collapses_whitespace_to_underscore() {
        assert_eq!(sanitize_filename("  two   words\tand\nlines "), "_two_words_and_lines_");
    }

    #[test]
    fn keeps_dots_and_dashes() {
        assert_eq!(sanitize_filename("live-2024.remaster"), "live-2024.remaster");
    }

    #[test]
    fn drops_non_ascii_word_characters() {
        assert_eq!(sanitize_filename("Café – déjà vu"), "Caf_dj_vu");
    }

    #[test]
    fn caps_length() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_filename(&long).len(), MAX_FILENAME_LEN);
    }
}
