//! Input validation and sanitization for todo payloads and path parameters

use std::borrow::Cow;
use validator::ValidationError;

use crate::AppError;

/// Maximum length of a todo text, counted in characters after trimming
pub const MAX_TODO_TEXT_LENGTH: usize = 500;

pub const TEXT_VALIDATION_MESSAGE: &str = "Invalid input: text must be 1-500 characters";
pub const INVALID_ID_MESSAGE: &str = "Invalid ID format";

/// Validate a todo text: non-empty and at most 500 characters once surrounding
/// whitespace is removed.
pub fn validate_todo_text(text: &str) -> Result<(), ValidationError> {
    let length = text.trim().chars().count();
    if length == 0 || length > MAX_TODO_TEXT_LENGTH {
        let mut error = ValidationError::new("text_length");
        error.message = Some(Cow::Borrowed(TEXT_VALIDATION_MESSAGE));
        error.add_param(Cow::Borrowed("max"), &MAX_TODO_TEXT_LENGTH);
        return Err(error);
    }
    Ok(())
}

/// Escape the HTML-significant characters `& < > " '`.
///
/// Applied exactly once, before text reaches the store. Stored text is
/// therefore always escaped and is returned to clients as-is.
pub fn sanitize_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Parse a raw path segment into a todo id. Only base-10 integers greater than
/// zero are accepted.
pub fn parse_todo_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::BadRequest(INVALID_ID_MESSAGE.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_length_bounds() {
        assert!(validate_todo_text("a").is_ok());
        assert!(validate_todo_text(&"a".repeat(500)).is_ok());
        assert!(validate_todo_text(&"a".repeat(501)).is_err());
        assert!(validate_todo_text("").is_err());
        assert!(validate_todo_text("   \t\n").is_err());
    }

    #[test]
    fn test_text_length_counts_characters_after_trim() {
        let padded = format!("   {}   ", "a".repeat(500));
        assert!(validate_todo_text(&padded).is_ok());

        // 500 multi-byte characters are still 500 characters
        assert!(validate_todo_text(&"é".repeat(500)).is_ok());
    }

    #[test]
    fn test_text_error_message() {
        let err = validate_todo_text("").unwrap_err();
        assert_eq!(err.message.as_deref(), Some(TEXT_VALIDATION_MESSAGE));
    }

    #[test]
    fn test_sanitize_escapes_markup() {
        assert_eq!(
            sanitize_text("<script>alert(\"x\")</script>"),
            "&lt;script&gt;alert(&#34;x&#34;)&lt;/script&gt;"
        );
        assert_eq!(sanitize_text("Tom & Jerry's"), "Tom &amp; Jerry&#39;s");
        assert_eq!(sanitize_text("buy milk"), "buy milk");
    }

    #[test]
    fn test_sanitize_is_not_idempotent_on_entities() {
        // Escaping runs once at the boundary; re-escaping would double-encode
        assert_eq!(sanitize_text("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_parse_todo_id() {
        assert_eq!(parse_todo_id("1").unwrap(), 1);
        assert_eq!(parse_todo_id("42").unwrap(), 42);
        assert!(parse_todo_id("0").is_err());
        assert!(parse_todo_id("-3").is_err());
        assert!(parse_todo_id("abc").is_err());
        assert!(parse_todo_id("").is_err());
        assert!(parse_todo_id("1.5").is_err());
        assert!(parse_todo_id("99999999999999999999999").is_err());
    }

    #[test]
    fn test_parse_todo_id_error_is_bad_request() {
        match parse_todo_id("abc") {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, INVALID_ID_MESSAGE),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
