//! Input validation functions
//!
//! Checks applied to request parameters before any upstream call is made.

use crate::errors::ValidationError;

/// Upper bound on token length accepted from clients
pub const MAX_TOKEN_LENGTH: usize = 2048;

fn validate_token(token: &str) -> Result<(), ValidationError> {
    let has_bad_char = token.chars().any(|c| c.is_whitespace() || c.is_control());
    if token.len() > MAX_TOKEN_LENGTH || has_bad_char {
        return Err(ValidationError::InvalidToken);
    }
    Ok(())
}

/// Validate an access token, rejecting absent or blank values
pub fn validate_access_token(token: Option<&str>) -> Result<&str, ValidationError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingAccessToken)?;
    validate_token(token)?;
    Ok(token)
}

/// Validate a refresh token, rejecting absent or blank values
pub fn validate_refresh_token(token: Option<&str>) -> Result<&str, ValidationError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingRefreshToken)?;
    validate_token(token)?;
    Ok(token)
}

/// Validate inclusive range bounds
pub fn validate_range(from: Option<i64>, to: Option<i64>) -> Result<(), ValidationError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ValidationError::InvertedRange { from, to }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_access_token() {
        assert_eq!(validate_access_token(None), Err(ValidationError::MissingAccessToken));
        assert_eq!(validate_access_token(Some("   ")), Err(ValidationError::MissingAccessToken));
    }

    #[test]
    fn test_access_token_is_trimmed() {
        assert_eq!(validate_access_token(Some(" abc123 ")), Ok("abc123"));
    }

    #[test]
    fn test_token_with_inner_whitespace_is_invalid() {
        assert_eq!(validate_refresh_token(Some("abc 123")), Err(ValidationError::InvalidToken));
        let long = "a".repeat(MAX_TOKEN_LENGTH + 1);
        assert_eq!(validate_access_token(Some(&long)), Err(ValidationError::InvalidToken));
    }

    #[test]
    fn test_missing_refresh_token() {
        assert_eq!(validate_refresh_token(Some("")), Err(ValidationError::MissingRefreshToken));
    }

    #[test]
    fn test_range_validation() {
        assert!(validate_range(Some(1), Some(2)).is_ok());
        assert!(validate_range(Some(2), Some(2)).is_ok());
        assert!(validate_range(None, Some(2)).is_ok());
        assert_eq!(
            validate_range(Some(3), Some(2)),
            Err(ValidationError::InvertedRange { from: 3, to: 2 })
        );
    }
}
