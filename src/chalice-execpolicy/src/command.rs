//! Command parsing for the policy engine.

use crate::error::PolicyError;

/// The program word of one simple command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// The program/executable name as written.
    pub program: String,

    /// The base name of the program (without path or `.exe`).
    pub program_basename: String,
}

impl ParsedCommand {
    /// Parse a command from already split arguments.
    pub fn from_args(args: &[String]) -> Result<Self, PolicyError> {
        let Some(program) = args.first() else {
            return Err(PolicyError::InvalidCommand("empty command".to_string()));
        };

        Ok(Self {
            program: program.clone(),
            program_basename: basename(program),
        })
    }

    /// Parse a single simple command from a shell string.
    ///
    /// Leading `NAME=value` assignments, shell keywords and prefixes
    /// (`if`, `do`, `!`, `exec`, `time`, ...) and grouping `(`/`{` are
    /// skipped so the program is the first real word.
    pub fn from_shell_string(cmd: &str) -> Result<Self, PolicyError> {
        let trimmed = cmd.trim();
        if trimmed.is_empty() {
            return Err(PolicyError::InvalidCommand("empty command".to_string()));
        }

        let parts = match shlex::split(trimmed) {
            Some(parts) if !parts.is_empty() => parts,
            // Unbalanced quotes: fall back to whitespace splitting
            _ => trimmed.split_whitespace().map(String::from).collect(),
        };

        let words = leading_command_words(parts);
        if words.is_empty() {
            return Err(PolicyError::InvalidCommand(
                "no executable in command".to_string(),
            ));
        }

        Self::from_args(&words)
    }

    /// Parse every simple command in a shell line.
    ///
    /// Splits on `;`, `&&`, `||`, `|`, `&` and newlines outside quotes.
    /// Empty segments are skipped.
    pub fn parse_segments(cmd: &str) -> Vec<ParsedCommand> {
        split_segments(cmd)
            .iter()
            .filter_map(|segment| Self::from_shell_string(segment).ok())
            .collect()
    }
}

/// Normalized basename used for list lookups.
pub(crate) fn basename(program: &str) -> String {
    let name = program
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(program);
    let name = match name.len().checked_sub(4) {
        Some(cut)
            if name
                .get(cut..)
                .is_some_and(|ext| ext.eq_ignore_ascii_case(".exe")) =>
        {
            &name[..cut]
        }
        _ => name,
    };
    name.to_ascii_lowercase()
}

/// Words that precede a command without being the command.
const COMMAND_PREFIXES: &[&str] = &[
    "if", "then", "else", "elif", "do", "while", "until", "!", "time", "exec", "command",
    "builtin",
];

/// Drop everything before the real program word.
fn leading_command_words(parts: Vec<String>) -> Vec<String> {
    let mut words = parts.into_iter().peekable();
    while let Some(word) = words.peek() {
        let stripped = word.trim_start_matches(['(', '{']);
        if stripped.is_empty()
            || COMMAND_PREFIXES.contains(&stripped)
            || is_env_assignment(stripped)
        {
            words.next();
            continue;
        }
        if stripped.len() != word.len() {
            let stripped = stripped.to_string();
            words.next();
            return std::iter::once(stripped).chain(words).collect();
        }
        break;
    }
    words.collect()
}

fn is_env_assignment(word: &str) -> bool {
    match word.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

fn split_segments(cmd: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = cmd.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                '\\' => {
                    current.push(c);
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                // Redirections such as `2>&1` and `&>file`
                '&' if current.ends_with(['>', '<']) || chars.peek() == Some(&'>') => {
                    current.push(c);
                }
                ';' | '\n' | '|' | '&' => {
                    // `&&`, `||` and `|&` collapse into one separator
                    if matches!(chars.peek(), Some('&' | '|')) && c != ';' && c != '\n' {
                        chars.next();
                    }
                    segments.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    segments.push(current);

    segments
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
