use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check the verification token Slack attaches to every request.
///
/// A missing token, or an empty configured token, never verifies.
pub fn verify_slack_token(configured: &str, provided: Option<&str>) -> bool {
    match provided {
        Some(token) if !configured.is_empty() => constant_time_compare(configured, token),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_verify_slack_token() {
        assert!(verify_slack_token("tok", Some("tok")));
        assert!(!verify_slack_token("tok", Some("other")));
        assert!(!verify_slack_token("tok", None));
    }

    #[test]
    fn test_verify_slack_token_empty_configured() {
        assert!(!verify_slack_token("", Some("")));
        assert!(!verify_slack_token("", None));
    }
}
