//! Password policy validation.
//!
//! Pure function, no I/O. All rules are evaluated independently so a caller
//! can report every violation at once instead of the first one found.

/// The fixed set of accepted special characters.
pub const SPECIAL_CHARACTERS: [char; 7] = ['@', '$', '!', '%', '*', '?', '&'];

/// Outcome of checking a password against the policy.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PolicyReport {
    missing: Vec<&'static str>,
}

impl PolicyReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// Unmet requirements, in rule order.
    #[must_use]
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    #[must_use]
    pub fn into_missing(self) -> Vec<&'static str> {
        self.missing
    }
}

/// Check a plaintext password against the policy.
///
/// Rules, in reporting order: length >= 8, an uppercase letter, a lowercase
/// letter, a digit, one of `@$!%*?&`.
#[must_use]
pub fn validate(password: &str) -> PolicyReport {
    let mut missing = Vec::new();

    if password.chars().count() < 8 {
        missing.push("at least 8 characters");
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("an uppercase letter");
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("a lowercase letter");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a number");
    }

    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(&c)) {
        missing.push("a special character (@$!%*?&)");
    }

    PolicyReport { missing }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        let report = validate("Ab1!aaaa");
        assert!(report.is_valid());
        assert!(report.missing().is_empty());
    }

    #[test]
    fn test_empty_password_misses_everything() {
        let report = validate("");
        assert!(!report.is_valid());
        assert_eq!(
            report.missing(),
            [
                "at least 8 characters",
                "an uppercase letter",
                "a lowercase letter",
                "a number",
                "a special character (@$!%*?&)",
            ]
        );
    }

    #[test]
    fn test_short_lowercase_password() {
        // "abc" satisfies the lowercase rule only
        let report = validate("abc");
        assert!(!report.is_valid());
        assert_eq!(
            report.missing(),
            [
                "at least 8 characters",
                "an uppercase letter",
                "a number",
                "a special character (@$!%*?&)",
            ]
        );
    }

    #[test]
    fn test_missing_lowercase_only() {
        let report = validate("ALLCAPS123!");
        assert!(!report.is_valid());
        assert_eq!(report.missing(), ["a lowercase letter"]);
    }

    #[test]
    fn test_each_special_character_accepted() {
        for special in SPECIAL_CHARACTERS {
            let report = validate(&format!("Abcdef1{special}"));
            assert!(report.is_valid(), "expected {special} to satisfy policy");
        }
    }

    #[test]
    fn test_unlisted_special_character_rejected() {
        let report = validate("Abcdefg1#");
        assert_eq!(report.missing(), ["a special character (@$!%*?&)"]);
    }
}
