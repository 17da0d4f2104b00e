//! Tests for the safety policy.

use super::*;

// ============================================================================
// Classification Tests
// ============================================================================

mod classify_tests {
    use super::*;

    #[test]
    fn test_denied_commands() {
        for cmd in ["rm", "dd", "mkfs", "shutdown", "systemctl", "/bin/rm", "RM"] {
            assert!(classify(cmd).is_denied(), "{cmd} should be denied");
        }
    }

    #[test]
    fn test_mkfs_variants_denied() {
        assert_eq!(
            classify("mkfs.ext4"),
            SafetyDecision::Denied {
                pattern: "mkfs".to_string()
            }
        );
    }

    #[test]
    fn test_allowed_commands() {
        for cmd in ["ls", "git", "cargo", "/usr/bin/grep", "python3"] {
            assert_eq!(classify(cmd), SafetyDecision::Allowed, "{cmd}");
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(classify("definitely-not-a-tool"), SafetyDecision::Unknown);
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let policy = SafetyPolicy::with_config(&PolicyConfig {
            allow: vec!["rm".to_string()],
            deny: vec!["git".to_string()],
            ..Default::default()
        });
        assert!(policy.classify("rm").is_denied());
        assert!(policy.classify("git").is_denied());
    }

    #[test]
    fn test_config_extends_lists() {
        let policy = SafetyPolicy::with_config(&PolicyConfig {
            allow: vec!["jq".to_string()],
            deny: vec!["terraform".to_string()],
            ..Default::default()
        });
        assert!(policy.classify("jq").is_allowed());
        assert!(policy.classify("terraform").is_denied());
        assert!(policy.classify("ls").is_allowed());
    }
}

// ============================================================================
// Program Mode Tests
// ============================================================================

mod program_tests {
    use super::*;

    #[test]
    fn test_check_program_denied() {
        let err = SafetyPolicy::new().check_program("rm").unwrap_err();
        assert!(err.is_blocked());
        assert_eq!(err.to_string(), "Command 'rm' is blacklisted for safety");
    }

    #[test]
    fn test_check_program_not_found() {
        let err = SafetyPolicy::new()
            .check_program("chalice-no-such-binary-xyz")
            .unwrap_err();
        assert!(!err.is_blocked());
        assert_eq!(
            err.to_string(),
            "Command not found: chalice-no-such-binary-xyz"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_check_program_unknown_on_path() {
        // `sh` is on neither list but always present
        assert_eq!(
            SafetyPolicy::new().check_program("sh"),
            Ok(SafetyDecision::Unknown)
        );
    }

    #[test]
    fn test_check_program_empty() {
        assert!(matches!(
            SafetyPolicy::new().check_program("  "),
            Err(PolicyError::InvalidCommand(_))
        ));
    }
}

// ============================================================================
// Shell Mode Tests
// ============================================================================

mod shell_tests {
    use super::*;

    #[test]
    fn test_catastrophic_patterns() {
        for cmd in [
            "rm -rf /",
            "sudo rm -rf /",
            "echo hi && rm   -rf   /",
            "dd if=/dev/zero of=/dev/sda",
            ":(){ :|:& };:",
            "chmod -R 777 /",
            "mkfs.ext4 /dev/sdb1",
        ] {
            let err = check_shell_command(cmd).unwrap_err();
            assert!(err.is_blocked(), "{cmd}");
            assert!(err.matched_pattern().is_some(), "{cmd}");
        }
    }

    #[test]
    fn test_dangerous_message() {
        assert_eq!(
            check_shell_command("rm -rf /").unwrap_err().to_string(),
            "Dangerous command blocked for safety"
        );
    }

    #[test]
    fn test_denied_leading_token_in_any_segment() {
        for cmd in ["rm notes.txt", "ls; rm x", "echo a | kill 1", "true && shutdown now"] {
            assert!(
                matches!(check_shell_command(cmd), Err(PolicyError::Denied { .. })),
                "{cmd}"
            );
        }
    }

    #[test]
    fn test_denied_command_inside_compound_syntax() {
        for cmd in [
            "if true; then rm -f x; fi",
            "(rm -f x)",
            "{ rm -f x; }",
            "exec rm -f x",
            "time rm -f x",
            "while false; do rm -f x; done",
            "until true; do :; done; ! kill 1",
            "command rm -f x",
        ] {
            assert!(
                matches!(check_shell_command(cmd), Err(PolicyError::Denied { .. })),
                "{cmd}"
            );
        }
    }

    #[test]
    fn test_safe_shell_commands() {
        for cmd in [
            "echo hello",
            "ls -la | wc -l",
            "cd /tmp && pwd",
            "echo 'rm is just a word'",
            "for i in 1 2 3; do echo $i; done",
        ] {
            assert!(check_shell_command(cmd).is_ok(), "{cmd}");
        }
    }

    #[test]
    fn test_custom_dangerous_pattern() {
        let policy = SafetyPolicy::with_config(&PolicyConfig {
            dangerous_patterns: vec!["curl | sh".to_string()],
            ..Default::default()
        });
        assert!(policy.check_shell("curl   |   sh").is_err());
    }

    #[test]
    fn test_empty_shell_command() {
        assert!(matches!(
            check_shell_command(""),
            Err(PolicyError::InvalidCommand(_))
        ));
    }
}

// ============================================================================
// Parsing Tests
// ============================================================================

mod parsing_tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        let segments = ParsedCommand::parse_segments("cat a.txt | grep foo && echo done");
        let programs: Vec<_> = segments.iter().map(|s| s.program.as_str()).collect();
        assert_eq!(programs, vec!["cat", "grep", "echo"]);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: PolicyConfig = serde_json::from_str(r#"{"deny": ["nc"]}"#).unwrap();
        assert_eq!(config.deny, vec!["nc"]);
        assert!(config.allow.is_empty());
    }
}
