//! On-disk stubs of the discovery tree.
//!
//! ```text
//! <out>/
//! ├── README.md
//! ├── index.json            server list
//! └── <server>/
//!     ├── index.json        manifest
//!     └── <tool>.json       full definition
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::client::DiscoveryClient;
use crate::types::ServerManifest;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{first}' and '{second}' both map to the file name '{stem}'")]
    NameCollision {
        first: String,
        second: String,
        stem: String,
    },

    #[error("{0}")]
    Lookup(#[from] chalice_tools::ToolError),
}

pub type Result<T> = std::result::Result<T, GenerateError>;

/// What a generation run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub servers: usize,
    pub tools: usize,
    pub files: Vec<PathBuf>,
}

pub struct Generator {
    client: Arc<DiscoveryClient>,
}

impl Generator {
    pub fn new(client: Arc<DiscoveryClient>) -> Self {
        Self { client }
    }

    /// Write the full tree under `out_dir`, overwriting earlier output.
    ///
    /// Nothing is written if two names would share a path.
    pub fn generate(&self, out_dir: &Path) -> Result<GenerateReport> {
        let mut report = GenerateReport {
            output_dir: out_dir.to_path_buf(),
            ..Default::default()
        };

        let manifests = self.client.manifests();
        check_stems(
            manifests.iter().map(|m| m.name.as_str()),
            &["index.json", "readme.md"],
        )?;
        for manifest in &manifests {
            check_stems(manifest.tools.iter().map(|t| t.name.as_str()), &["index"])?;
        }
        create_dir(out_dir)?;

        for manifest in &manifests {
            let server_dir = out_dir.join(file_stem(&manifest.name));
            create_dir(&server_dir)?;

            for tool in &manifest.tools {
                let definition = self.client.get_tool_definition(&manifest.name, &tool.name)?;
                let path = server_dir.join(format!("{}.json", file_stem(&tool.name)));
                write_json(&path, &definition, &tool.name)?;
                report.files.push(path);
                report.tools += 1;
            }

            let index = server_dir.join("index.json");
            write_json(&index, manifest, &manifest.name)?;
            report.files.push(index);
            report.servers += 1;
            debug!(server = %manifest.name, tools = manifest.tools.len(), "Generated server stubs");
        }

        let servers: Vec<_> = manifests
            .iter()
            .map(|m| json!({ "name": m.name, "description": m.description, "tool_count": m.tools.len() }))
            .collect();
        let index = out_dir.join("index.json");
        write_json(&index, &json!({ "servers": servers }), "server index")?;
        report.files.push(index);

        let readme = out_dir.join("README.md");
        write_file(&readme, &render_readme(&manifests))?;
        report.files.push(readme);

        info!(
            output = %out_dir.display(),
            servers = report.servers,
            tools = report.tools,
            "Generated discovery stubs"
        );
        Ok(report)
    }
}

/// Keep names usable as path components.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match stem.trim_matches('.') {
        "" => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Fail if two names sanitize to the same stem, or a name takes a reserved
/// one. Compared case-insensitively for case-folding filesystems.
fn check_stems<'a>(names: impl Iterator<Item = &'a str>, reserved: &[&str]) -> Result<()> {
    let mut seen: HashMap<String, &str> = reserved.iter().map(|r| (r.to_string(), *r)).collect();
    for name in names {
        let stem = file_stem(name);
        if let Some(first) = seen.insert(stem.to_lowercase(), name) {
            return Err(GenerateError::NameCollision {
                first: first.to_string(),
                second: name.to_string(),
                stem,
            });
        }
    }
    Ok(())
}

fn render_readme(manifests: &[ServerManifest]) -> String {
    let mut out = String::from("# Tool servers\n\n");
    out.push_str(
        "Generated discovery tree. Read `index.json` for the server list, \
         `<server>/index.json` for a server's tools and `<server>/<tool>.json` \
         for one tool's full schema.\n\n```text\n",
    );
    for manifest in manifests {
        let _ = writeln!(out, "{}/", file_stem(&manifest.name));
        for tool in &manifest.tools {
            let _ = writeln!(out, "    {}.json", file_stem(&tool.name));
        }
    }
    out.push_str("```\n");

    for manifest in manifests {
        let _ = writeln!(out, "\n## {}\n\n{}\n", manifest.name, manifest.description);
        for tool in &manifest.tools {
            let _ = writeln!(out, "- `{}`: {}", tool.name, tool.description);
        }
    }
    out
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, what: &str) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| GenerateError::Serialize {
        what: what.to_string(),
        source,
    })?;
    text.push('\n');
    write_file(path, &text)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
