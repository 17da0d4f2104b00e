//! Environment scrubbing for guest processes.
//!
//! Guest code is caller supplied, so credentials sitting in the parent's
//! environment are withheld from it.

/// Substrings (upper case) marking a variable name as carrying a credential.
const SENSITIVE_PATTERNS: &[&str] = &[
    "KEY",        // API_KEY, SSH_KEY
    "SECRET",     // AWS_SECRET_ACCESS_KEY
    "TOKEN",      // GITHUB_TOKEN
    "PASSWORD",   // DB_PASSWORD
    "CREDENTIAL", // GOOGLE_APPLICATION_CREDENTIALS
    "PRIVATE",    // PRIVATE_KEY
];

/// Variables forced on every guest so tools never stop for interactive input.
const NON_INTERACTIVE_ENV: &[(&str, &str)] = &[
    ("CI", "true"),
    ("DEBIAN_FRONTEND", "noninteractive"),
    ("NO_COLOR", "1"),
    ("TERM", "dumb"),
];

/// Returns true if the variable name looks like it holds a secret.
pub fn is_sensitive_env_var(name: &str) -> bool {
    let upper = name.to_uppercase();
    SENSITIVE_PATTERNS.iter().any(|p| upper.contains(p))
}

/// Current environment minus sensitive variables, plus non-interactive defaults.
pub fn sanitized_env() -> Vec<(String, String)> {
    let mut env: Vec<(String, String)> = std::env::vars()
        .filter(|(key, _)| !is_sensitive_env_var(key))
        .filter(|(key, _)| !NON_INTERACTIVE_ENV.iter().any(|(k, _)| k == key))
        .collect();
    env.extend(
        NON_INTERACTIVE_ENV
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
    );
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_sensitive_names() {
        assert!(is_sensitive_env_var("OPENAI_API_KEY"));
        assert!(is_sensitive_env_var("github_token"));
        assert!(is_sensitive_env_var("DB_PASSWORD"));
        assert!(!is_sensitive_env_var("PATH"));
        assert!(!is_sensitive_env_var("HOME"));
    }

    #[test]
    #[serial]
    fn test_sanitized_env_drops_secrets() {
        // SAFETY: serialized with the other env-mutating tests
        unsafe {
            std::env::set_var("CHALICE_TEST_SECRET", "hunter2");
        }
        let env = sanitized_env();
        unsafe {
            std::env::remove_var("CHALICE_TEST_SECRET");
        }

        assert!(!env.iter().any(|(k, _)| k == "CHALICE_TEST_SECRET"));
        assert!(env.iter().any(|(k, v)| k == "NO_COLOR" && v == "1"));
        assert_eq!(env.iter().filter(|(k, _)| k == "CI").count(), 1);
    }
}
