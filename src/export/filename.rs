//! File names for extracted records: `{date}_{subject}.txt`.

/// Maximum file name length in characters, extension included.
pub const MAX_NAME_CHARS: usize = 80;

/// Extension of every record file.
pub const EXTENSION: &str = ".txt";

/// Joins the date and the subject.
pub const SEPARATOR: char = '_';

/// Used when the subject is empty after sanitizing.
pub const UNTITLED: &str = "untitled";

/// Characters that are not allowed in file names on common platforms.
pub const ILLEGAL_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace illegal path characters and control characters with `_`, then
/// trim surrounding whitespace.
///
/// Returns [`UNTITLED`] if nothing is left.
pub fn sanitize_subject(subject: &str) -> String {
    let replaced: String = subject
        .chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                SEPARATOR
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build the record file name from a normalized date and a raw subject.
///
/// The result never exceeds [`MAX_NAME_CHARS`] characters unless `date`
/// alone does. When no room is left for the subject, the name is the date
/// alone.
pub fn record_file_name(date: &str, subject: &str) -> String {
    let subject = sanitize_subject(subject);
    let available = MAX_NAME_CHARS as isize
        - EXTENSION.chars().count() as isize
        - date.chars().count() as isize
        - 1;

    if available <= 0 {
        return format!("{date}{EXTENSION}");
    }

    let truncated: String = subject.chars().take(available as usize).collect();
    let truncated = truncated.trim_end_matches(|c: char| c == SEPARATOR || c.is_whitespace());
    if truncated.is_empty() {
        format!("{date}{EXTENSION}")
    } else {
        format!("{date}{SEPARATOR}{truncated}{EXTENSION}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "20251027180020";

    fn subject_part(name: &str) -> &str {
        name.strip_prefix(DATE)
            .and_then(|s| s.strip_prefix(SEPARATOR))
            .and_then(|s| s.strip_suffix(EXTENSION))
            .unwrap()
    }

    #[test]
    fn test_simple_name() {
        assert_eq!(
            record_file_name(DATE, "Fix crash"),
            "20251027180020_Fix crash.txt"
        );
    }

    #[test]
    fn test_illegal_chars_replaced() {
        let name = record_file_name(DATE, r#"a/b\c:d*e?f"g<h>i|j"#);
        assert_eq!(name, "20251027180020_a_b_c_d_e_f_g_h_i_j.txt");
    }

    #[test]
    fn test_reply_subject_with_long_date() {
        let date = "20251027180020123456";
        let name = record_file_name(date, "Re: fix crash: a/b");
        assert!(name.starts_with("20251027180020123456_"));
        assert!(name.chars().count() <= MAX_NAME_CHARS);
        assert!(!name.contains(ILLEGAL_CHARS));
        assert_eq!(name, "20251027180020123456_Re_ fix crash_ a_b.txt");
    }

    #[test]
    fn test_control_chars_replaced() {
        let name = record_file_name(DATE, "a\0b\nc\td\u{7f}e");
        assert_eq!(name, "20251027180020_a_b_c_d_e.txt");
        assert!(!name.chars().any(char::is_control));
    }

    #[test]
    fn test_empty_subject_placeholder() {
        assert_eq!(record_file_name(DATE, "   "), "20251027180020_untitled.txt");
        assert_eq!(sanitize_subject(""), UNTITLED);
    }

    #[test]
    fn test_truncation_respects_limit() {
        let long = "x".repeat(300);
        let name = record_file_name(DATE, &long);
        assert_eq!(name.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let long = "修".repeat(100);
        let name = record_file_name(DATE, &long);
        assert_eq!(name.chars().count(), MAX_NAME_CHARS);
        assert!(name.len() > MAX_NAME_CHARS);
    }

    #[test]
    fn test_trailing_separator_stripped() {
        // 61 chars available: cut lands just after "__"
        let subject = format!("{}__tail", "a".repeat(59));
        let name = record_file_name(DATE, &subject);
        assert_eq!(subject_part(&name), "a".repeat(59));
    }

    #[test]
    fn test_no_room_for_subject() {
        let date = "9".repeat(75);
        assert_eq!(record_file_name(&date, "anything"), format!("{date}.txt"));
    }

    #[test]
    fn test_idempotent() {
        for subject in [
            "Fix crash",
            "Re: fix crash: a/b",
            "  padded  ",
            &"word ".repeat(40),
            &"ab_".repeat(40),
            "混合 subject: with/slashes",
        ] {
            let name = record_file_name(DATE, subject);
            let again = record_file_name(DATE, subject_part(&name));
            assert_eq!(name, again, "not idempotent for {subject:?}");
            assert!(name.chars().count() <= MAX_NAME_CHARS);
            assert!(!name.contains(ILLEGAL_CHARS));
        }
    }
}
