//! Guest languages and interpreter resolution.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestLanguage {
    Python,
    JavaScript,
    /// A command line handed to the platform shell.
    Shell,
}

impl GuestLanguage {
    pub const ALL: [GuestLanguage; 3] = [Self::Python, Self::JavaScript, Self::Shell];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Shell => "shell",
        }
    }

    /// Name used in "not installed" messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JavaScript => "Node.js",
            Self::Shell => "Shell",
        }
    }

    /// Whether the source is written to a temporary file before running.
    pub fn uses_script_file(&self) -> bool {
        !matches!(self, Self::Shell)
    }

    pub fn script_suffix(&self) -> &'static str {
        match self {
            Self::Python => ".py",
            Self::JavaScript => ".js",
            Self::Shell => "",
        }
    }

    /// Interpreter names tried in order when no override is configured.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            #[cfg(windows)]
            Self::Python => &["python", "py", "python3"],
            #[cfg(not(windows))]
            Self::Python => &["python3", "python"],
            Self::JavaScript => &["node", "nodejs"],
            #[cfg(windows)]
            Self::Shell => &["cmd"],
            #[cfg(not(windows))]
            Self::Shell => &["bash", "sh"],
        }
    }
}

impl std::fmt::Display for GuestLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuestLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Ok(Self::Python),
            "javascript" | "js" | "node" => Ok(Self::JavaScript),
            "shell" | "bash" | "sh" => Ok(Self::Shell),
            other => Err(format!("unknown guest language: {other}")),
        }
    }
}

/// A resolved interpreter executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub language: GuestLanguage,
    pub program: PathBuf,
}

impl Interpreter {
    /// Find the interpreter for `language`.
    ///
    /// An override is resolved alone; otherwise the candidates are tried in
    /// order. Returns a human-readable error when nothing resolves.
    pub fn resolve(language: GuestLanguage, override_path: Option<&Path>) -> Result<Self, String> {
        if let Some(path) = override_path {
            return which::which(path)
                .map(|program| Self { language, program })
                .map_err(|_| {
                    format!(
                        "Configured {} interpreter not found: {}",
                        language.display_name(),
                        path.display()
                    )
                });
        }

        language
            .candidates()
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|program| Self { language, program })
            .ok_or_else(|| {
                format!(
                    "{} is not installed (tried: {})",
                    language.display_name(),
                    language.candidates().join(", ")
                )
            })
    }

    /// Arguments that run `target`: a script path, or the command line for shells.
    pub fn args_for(&self, target: &OsString) -> Vec<OsString> {
        match self.language {
            GuestLanguage::Shell if is_cmd(&self.program) => {
                vec!["/C".into(), target.clone()]
            }
            GuestLanguage::Shell => vec!["-c".into(), target.clone()],
            _ => vec![target.clone()],
        }
    }
}

fn is_cmd(program: &Path) -> bool {
    program
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case("cmd"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("Python".parse::<GuestLanguage>(), Ok(GuestLanguage::Python));
        assert_eq!("js".parse::<GuestLanguage>(), Ok(GuestLanguage::JavaScript));
        assert_eq!("bash".parse::<GuestLanguage>(), Ok(GuestLanguage::Shell));
        assert!("ruby".parse::<GuestLanguage>().is_err());
    }

    #[test]
    fn test_script_files() {
        assert!(GuestLanguage::Python.uses_script_file());
        assert!(GuestLanguage::JavaScript.uses_script_file());
        assert!(!GuestLanguage::Shell.uses_script_file());
        assert_eq!(GuestLanguage::JavaScript.script_suffix(), ".js");
    }

    #[test]
    fn test_missing_override_fails_fast() {
        let err = Interpreter::resolve(
            GuestLanguage::Python,
            Some(Path::new("/nonexistent/chalice-python")),
        )
        .unwrap_err();
        assert!(err.contains("Configured Python interpreter not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_resolves() {
        let interp = Interpreter::resolve(GuestLanguage::Shell, None).unwrap();
        let args = interp.args_for(&"echo hi".into());
        assert_eq!(args[0], "-c");
        assert_eq!(args[1], "echo hi");
    }
}
