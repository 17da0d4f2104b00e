//! `filesystem` server: file and directory operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use chalice_mcp::DiscoveryServer;
use chalice_tools::{
    ParameterSchema, PropertySchema, Result, Tool, ToolArgs, ToolError, ToolSpec, parse_args,
};
use serde::Deserialize;
use serde_json::{Value, json};

pub const SERVER_NAME: &str = "filesystem";

const DEFAULT_READ_LIMIT: usize = 2000;

/// Absolute form of `path`, relative to the current directory.
fn resolve(path: &str) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path))
}

fn fail(message: impl std::fmt::Display) -> ToolError {
    ToolError::execution(message)
}

fn modified_secs(meta: &std::fs::Metadata) -> Option<f64> {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
}

#[cfg(unix)]
fn permissions(meta: &std::fs::Metadata) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;
    Some(format!("{:03o}", meta.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn permissions(_meta: &std::fs::Metadata) -> Option<String> {
    None
}

fn path_schema(description: &str) -> ParameterSchema {
    ParameterSchema::object()
        .property("path", PropertySchema::string().description(description))
        .required(vec!["path"])
}

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

// ============================================================================
// read_file
// ============================================================================

pub struct ReadFileTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct ReadFileArgs {
    path: String,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_read_limit")]
    limit: usize,
}

fn default_read_limit() -> usize {
    DEFAULT_READ_LIMIT
}

impl Default for ReadFileTool {
    fn default() -> Self {
        let spec = ToolSpec::new(
            "read_file",
            "Read content from a file with optional line range limits",
        )
        .with_parameters(
            ParameterSchema::object()
                .property(
                    "path",
                    PropertySchema::string().description("Absolute or relative file path to read"),
                )
                .property(
                    "offset",
                    PropertySchema::integer()
                        .description("Starting line number (0-based)")
                        .default_value(0),
                )
                .property(
                    "limit",
                    PropertySchema::integer()
                        .description("Maximum number of lines to read")
                        .default_value(DEFAULT_READ_LIMIT as u64),
                )
                .required(vec!["path"]),
        )
        .with_returns("{path, content, lines_read, total_lines, start_line, end_line}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: ReadFileArgs = parse_args(args)?;
        let path = resolve(&args.path);
        if !path.exists() {
            return Err(fail(format!("File does not exist: {}", path.display())));
        }
        if !path.is_file() {
            return Err(fail(format!("Path is not a file: {}", path.display())));
        }

        let bytes = tokio::fs::read(&path).await?;
        let text = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let total = lines.len();
        let start = args.offset.min(total);
        let end = start.saturating_add(args.limit).min(total);

        Ok(json!({
            "path": path.display().to_string(),
            "content": lines[start..end].concat(),
            "lines_read": end - start,
            "total_lines": total,
            "start_line": start,
            "end_line": end as i64 - 1,
        }))
    }
}

// ============================================================================
// write_file
// ============================================================================

pub struct WriteFileTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct WriteFileArgs {
    path: String,
    content: String,
}

impl Default for WriteFileTool {
    fn default() -> Self {
        let spec = ToolSpec::new("write_file", "Write or overwrite content to a file")
            .with_parameters(
                ParameterSchema::object()
                    .property(
                        "path",
                        PropertySchema::string()
                            .description("Absolute or relative file path to write to"),
                    )
                    .property(
                        "content",
                        PropertySchema::string().description("Content to write to the file"),
                    )
                    .required(vec!["path", "content"]),
            )
            .with_returns("{path, bytes_written, lines_written}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: WriteFileArgs = parse_args(args)?;
        let path = resolve(&args.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, args.content.as_bytes()).await?;

        Ok(json!({
            "path": path.display().to_string(),
            "bytes_written": args.content.len(),
            "lines_written": args.content.lines().count(),
        }))
    }
}

// ============================================================================
// list_directory
// ============================================================================

pub struct ListDirectoryTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct ListDirectoryArgs {
    #[serde(default = "current_dir")]
    path: String,
}

fn current_dir() -> String {
    ".".to_string()
}

impl Default for ListDirectoryTool {
    fn default() -> Self {
        let spec = ToolSpec::new(
            "list_directory",
            "List all files and subdirectories in a given path with their types and sizes",
        )
        .with_parameters(
            ParameterSchema::object().property(
                "path",
                PropertySchema::string()
                    .description("Absolute or relative directory path to list")
                    .default_value("."),
            ),
        )
        .with_returns("{path, items: [{name, type, size, modified}], count}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: ListDirectoryArgs = parse_args(args)?;
        let path = resolve(&args.path);
        if !path.exists() {
            return Err(fail(format!("Path does not exist: {}", path.display())));
        }
        if !path.is_dir() {
            return Err(fail(format!("Path is not a directory: {}", path.display())));
        }

        let mut entries = tokio::fs::read_dir(&path).await?;
        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Follows symlinks, like a plain stat
            let item = match tokio::fs::metadata(entry.path()).await {
                Ok(meta) => json!({
                    "name": name,
                    "type": if meta.is_dir() { "directory" } else { "file" },
                    "size": meta.is_file().then(|| meta.len()),
                    "modified": modified_secs(&meta),
                }),
                Err(_) => json!({ "name": name, "type": "unknown", "size": null, "modified": null }),
            };
            items.push((name, item));
        }
        items.sort_by(|a, b| a.0.cmp(&b.0));
        let items: Vec<Value> = items.into_iter().map(|(_, item)| item).collect();

        Ok(json!({
            "path": path.display().to_string(),
            "count": items.len(),
            "items": items,
        }))
    }
}

// ============================================================================
// create_directory
// ============================================================================

pub struct CreateDirectoryTool {
    spec: ToolSpec,
}

impl Default for CreateDirectoryTool {
    fn default() -> Self {
        let spec = ToolSpec::new(
            "create_directory",
            "Create a new directory and any necessary parent directories",
        )
        .with_parameters(path_schema("Absolute or relative directory path to create"));
        Self { spec }
    }
}

#[async_trait]
impl Tool for CreateDirectoryTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: PathArgs = parse_args(args)?;
        let path = resolve(&args.path);
        if path.is_dir() {
            return Ok(json!({
                "path": path.display().to_string(),
                "created": false,
                "message": format!("Directory already exists: {}", path.display()),
            }));
        }
        if path.exists() {
            return Err(fail(format!(
                "Path exists but is not a directory: {}",
                path.display()
            )));
        }
        tokio::fs::create_dir_all(&path).await?;
        Ok(json!({ "path": path.display().to_string(), "created": true }))
    }
}

// ============================================================================
// delete_path
// ============================================================================

pub struct DeletePathTool {
    spec: ToolSpec,
}

impl Default for DeletePathTool {
    fn default() -> Self {
        let spec = ToolSpec::new(
            "delete_path",
            "Delete a file or directory (recursive for directories)",
        )
        .with_parameters(path_schema("Absolute or relative path to delete"));
        Self { spec }
    }
}

#[async_trait]
impl Tool for DeletePathTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: PathArgs = parse_args(args)?;
        let path = resolve(&args.path);
        let meta = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|_| fail(format!("Path does not exist: {}", path.display())))?;

        let kind = if meta.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
            "directory"
        } else {
            tokio::fs::remove_file(&path).await?;
            "file"
        };
        Ok(json!({ "path": path.display().to_string(), "deleted": true, "type": kind }))
    }
}

// ============================================================================
// move_path
// ============================================================================

pub struct MovePathTool {
    spec: ToolSpec,
}

#[derive(Deserialize)]
struct MovePathArgs {
    src: String,
    dst: String,
}

impl Default for MovePathTool {
    fn default() -> Self {
        let spec = ToolSpec::new("move_path", "Move or rename a file or directory")
            .with_parameters(
                ParameterSchema::object()
                    .property("src", PropertySchema::string().description("Source path to move"))
                    .property("dst", PropertySchema::string().description("Destination path"))
                    .required(vec!["src", "dst"]),
            );
        Self { spec }
    }
}

#[async_trait]
impl Tool for MovePathTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: MovePathArgs = parse_args(args)?;
        let src = resolve(&args.src);
        let mut dst = resolve(&args.dst);
        if !src.exists() {
            return Err(fail(format!("Source path does not exist: {}", src.display())));
        }
        // Moving into an existing directory keeps the source name
        if dst.is_dir()
            && let Some(name) = src.file_name()
        {
            dst = dst.join(name);
        }
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        move_path(&src, &dst).await?;

        Ok(json!({
            "src": src.display().to_string(),
            "dst": dst.display().to_string(),
            "moved": true,
        }))
    }
}

/// Rename, falling back to copy + delete for files across filesystems.
async fn move_path(src: &Path, dst: &Path) -> Result<()> {
    match tokio::fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(_) if src.is_file() => {
            tokio::fs::copy(src, dst).await?;
            tokio::fs::remove_file(src).await?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

// ============================================================================
// file_exists
// ============================================================================

pub struct FileExistsTool {
    spec: ToolSpec,
}

impl Default for FileExistsTool {
    fn default() -> Self {
        let spec = ToolSpec::new(
            "file_exists",
            "Check if a path exists and return its type and metadata",
        )
        .with_parameters(path_schema("Path to check for existence"))
        .with_returns("{path, exists, type, size, modified, permissions}");
        Self { spec }
    }
}

#[async_trait]
impl Tool for FileExistsTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn execute(&self, args: ToolArgs) -> Result<Value> {
        let args: PathArgs = parse_args(args)?;
        let path = resolve(&args.path);
        let Ok(meta) = tokio::fs::metadata(&path).await else {
            return Ok(json!({ "path": path.display().to_string(), "exists": false }));
        };

        Ok(json!({
            "path": path.display().to_string(),
            "exists": true,
            "type": if meta.is_dir() { "directory" } else { "file" },
            "size": meta.is_file().then(|| meta.len()),
            "modified": modified_secs(&meta),
            "permissions": permissions(&meta),
        }))
    }
}

pub fn filesystem_server() -> DiscoveryServer {
    DiscoveryServer::new(
        SERVER_NAME,
        "File and directory operations with secure path handling",
    )
    .with_tool(Arc::new(ReadFileTool::default()))
    .with_tool(Arc::new(WriteFileTool::default()))
    .with_tool(Arc::new(ListDirectoryTool::default()))
    .with_tool(Arc::new(CreateDirectoryTool::default()))
    .with_tool(Arc::new(DeletePathTool::default()))
    .with_tool(Arc::new(MovePathTool::default()))
    .with_tool(Arc::new(FileExistsTool::default()))
}
