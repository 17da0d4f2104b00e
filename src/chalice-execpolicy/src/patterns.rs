//! Built-in command lists.

/// Basenames refused regardless of arguments.
pub const DENIED_COMMANDS: &[&str] = &[
    "rm", "rmdir", "del", "format", "mkfs", "dd", "chmod", "chown", "kill", "killall",
    "shutdown", "reboot", "init", "systemctl", "service",
];

/// Common read-only and developer-tool basenames.
pub const ALLOWED_COMMANDS: &[&str] = &[
    // Inspection
    "ls", "pwd", "whoami", "date", "echo", "cat", "head", "tail", "grep", "find", "wc", "sort",
    "uniq", "diff", "which",
    // Toolchains
    "pip", "npm", "node", "python", "python3", "git", "docker", "kubectl", "make", "cargo", "go",
    "rustc", "java", "javac", "gcc", "g++", "clang",
    // Network
    "curl", "wget", "ping", "traceroute", "netstat",
    // System state
    "ps", "top", "df", "du", "free", "uptime",
];

/// Substrings that block a shell command wherever they appear.
pub const DANGEROUS_PATTERNS: &[&str] = &[
    "rm -rf /",
    "mkfs",
    "dd if=",
    ":(){:|:&};:",
    "chmod -R 777 /",
];
