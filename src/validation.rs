//! Input validation for player commands and session identifiers.

/// Default cap on a single command line, in bytes.
pub const MAX_INPUT_LEN: usize = 256;

/// Rejected input, with a message safe to show the player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("That command is too long (maximum {max} characters).")]
    TooLong { max: usize },

    #[error("Session id must be a valid UUID")]
    InvalidSessionId,
}

/// Sanitize a raw command line before parsing.
///
/// Control characters (including embedded newlines and tabs) become spaces,
/// so a pasted multi-line string is treated as one command. Length is checked
/// on the raw input.
pub fn sanitize_command_input(input: &str, max_bytes: usize) -> Result<String, InputError> {
    if input.len() > max_bytes {
        return Err(InputError::TooLong { max: max_bytes });
    }
    let cleaned: String = input
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    Ok(cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Validate a session id (must be a UUID).
pub fn validate_session_id(id: &str) -> Result<String, InputError> {
    let trimmed = id.trim();
    match uuid::Uuid::parse_str(trimmed) {
        Ok(uuid) => Ok(uuid.to_string()),
        Err(_) => Err(InputError::InvalidSessionId),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_characters_collapse_to_spaces() {
        assert_eq!(
            sanitize_command_input("take\n lamp\t\x07now", MAX_INPUT_LEN).expect("ok"),
            "take lamp now"
        );
        assert_eq!(sanitize_command_input("   ", MAX_INPUT_LEN).expect("ok"), "");
    }

    #[test]
    fn overlong_input_rejected() {
        let long = "x".repeat(MAX_INPUT_LEN + 1);
        assert_eq!(
            sanitize_command_input(&long, MAX_INPUT_LEN),
            Err(InputError::TooLong { max: MAX_INPUT_LEN })
        );
    }

    #[test]
    fn session_ids_must_be_uuids() {
        let id = uuid::Uuid::new_v4().to_string();
        assert_eq!(validate_session_id(&format!(" {} ", id)).expect("valid"), id);
        assert_eq!(validate_session_id("../etc/passwd"), Err(InputError::InvalidSessionId));
    }
}
