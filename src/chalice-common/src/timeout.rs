//! Centralized timeout constants.
//!
//! Guest-code execution is always bounded by [`MIN_EXEC_TIMEOUT_SECS`] and
//! [`MAX_EXEC_TIMEOUT_SECS`], whatever the caller asks for.

/// Default timeout for a single guest execution in seconds.
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 30;

/// Lower bound applied to any requested execution timeout.
pub const MIN_EXEC_TIMEOUT_SECS: u64 = 1;

/// Upper bound applied to any requested execution timeout (5 minutes).
pub const MAX_EXEC_TIMEOUT_SECS: u64 = 300;

/// Default timeout for outbound HTTP requests made by api tools.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Upper bound for outbound HTTP request timeouts.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 120;

/// How long to keep draining pipes after the child has been killed.
///
/// A descendant that escaped the process group can hold the pipe open; after
/// this grace period whatever was buffered is reported as partial output.
pub const OUTPUT_DRAIN_GRACE_MS: u64 = 500;

/// Clamps a requested execution timeout into the supported range.
pub fn clamp_exec_timeout(requested_secs: i64) -> u64 {
    requested_secs.clamp(MIN_EXEC_TIMEOUT_SECS as i64, MAX_EXEC_TIMEOUT_SECS as i64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_timeout_values_are_reasonable() {
        assert!(MIN_EXEC_TIMEOUT_SECS < DEFAULT_EXEC_TIMEOUT_SECS);
        assert!(DEFAULT_EXEC_TIMEOUT_SECS < MAX_EXEC_TIMEOUT_SECS);
        assert!(DEFAULT_HTTP_TIMEOUT_SECS <= MAX_HTTP_TIMEOUT_SECS);
    }

    #[test]
    fn test_clamp_exec_timeout() {
        assert_eq!(clamp_exec_timeout(-5), 1);
        assert_eq!(clamp_exec_timeout(0), 1);
        assert_eq!(clamp_exec_timeout(1), 1);
        assert_eq!(clamp_exec_timeout(45), 45);
        assert_eq!(clamp_exec_timeout(300), 300);
        assert_eq!(clamp_exec_timeout(301), 300);
        assert_eq!(clamp_exec_timeout(i64::MAX), 300);
    }
}
