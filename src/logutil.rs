//! Helpers for putting player-supplied text into log lines.
//! Output is always a single line of bounded length.

/// Default preview length for player input in logs.
pub const LOG_PREVIEW_CHARS: usize = 120;

/// Escape `s` for single-line logging, truncated to [`LOG_PREVIEW_CHARS`].
pub fn escape_log(s: &str) -> String {
    escape_log_with_limit(s, LOG_PREVIEW_CHARS)
}

/// Escape newlines, tabs, backslashes and other control characters
/// (`\n`, `\t`, `\\`, `\xNN`) and cut the result after `limit` characters
/// with an ellipsis.
pub fn escape_log_with_limit(s: &str, limit: usize) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(s.len().min(limit) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= limit {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("go\nnorth\t\\"), "go\\nnorth\\t\\\\");
        assert_eq!(escape_log("\x07"), "\\x07");
    }

    #[test]
    fn truncates_long_input() {
        let out = escape_log_with_limit("abcdef", 3);
        assert_eq!(out, "abc…");
        assert_eq!(escape_log(&"z".repeat(500)).chars().count(), LOG_PREVIEW_CHARS + 1);
    }
}
