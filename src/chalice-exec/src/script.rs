//! Temporary script files.

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;
use tracing::debug;

use crate::language::GuestLanguage;

/// Source written to a uniquely named file that lives exactly as long as
/// this value.
#[derive(Debug)]
pub struct ScriptFile {
    path: TempPath,
}

impl ScriptFile {
    /// Write `source` to a fresh file in `dir` (or the system temp dir).
    ///
    /// The handle is closed before returning so the interpreter can open it
    /// on every platform.
    pub fn create(
        dir: Option<&Path>,
        language: GuestLanguage,
        source: &str,
    ) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("chalice-").suffix(language.script_suffix());
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(source.as_bytes())?;
        file.flush()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. Failure is logged and otherwise ignored.
    pub fn remove(self) {
        let shown = self.path.display().to_string();
        if let Err(err) = self.path.close() {
            debug!(path = %shown, error = %err, "Failed to remove script file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let script = ScriptFile::create(Some(dir.path()), GuestLanguage::Python, "print(1)").unwrap();
        let path = script.path().to_path_buf();

        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().unwrap(), "py");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print(1)");

        script.remove();
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = ScriptFile::create(Some(dir.path()), GuestLanguage::JavaScript, "").unwrap();
        std::fs::remove_file(script.path()).unwrap();
        script.remove();
    }
}
