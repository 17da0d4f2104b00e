mod common;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn call(tool: &str, args: Value) -> Value {
    common::client().call_tool_json("filesystem", tool, args).await
}

#[tokio::test]
async fn test_write_then_read_with_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("notes.txt");
    let path_str = path.to_str().unwrap();

    let written = call(
        "write_file",
        json!({ "path": path_str, "content": "one\ntwo\nthree\nfour\n" }),
    )
    .await;
    assert_eq!(written["bytes_written"], 19);
    assert_eq!(written["lines_written"], 4);

    let read = call("read_file", json!({ "path": path_str, "offset": 1, "limit": 2 })).await;
    assert_eq!(read["content"], "two\nthree\n");
    assert_eq!(read["lines_read"], 2);
    assert_eq!(read["total_lines"], 4);
    assert_eq!(read["start_line"], 1);
    assert_eq!(read["end_line"], 2);

    let past_end = call("read_file", json!({ "path": path_str, "offset": 10 })).await;
    assert_eq!(past_end["content"], "");
    assert_eq!(past_end["lines_read"], 0);
}

#[tokio::test]
async fn test_read_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let payload = call("read_file", json!({ "path": path })).await;
    let message = payload["error"].as_str().unwrap();
    assert!(message.contains("File does not exist"), "{message}");

    let payload = call("read_file", json!({ "path": dir.path() })).await;
    assert!(payload["error"].as_str().unwrap().contains("Path is not a file"));
}

#[tokio::test]
async fn test_list_directory_sorted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.txt"), "bb").unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let listing = call("list_directory", json!({ "path": dir.path() })).await;
    assert_eq!(listing["count"], 3);
    let names: Vec<_> = listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
    assert_eq!(listing["items"][1]["size"], 2);
    assert_eq!(listing["items"][2]["type"], "directory");
    assert!(listing["items"][2]["size"].is_null());
}

#[tokio::test]
async fn test_create_move_exists_delete() {
    let dir = tempfile::tempdir().unwrap();
    let made = dir.path().join("x").join("y");

    let created = call("create_directory", json!({ "path": made })).await;
    assert_eq!(created["created"], true);
    let again = call("create_directory", json!({ "path": made })).await;
    assert_eq!(again["created"], false);

    let src = dir.path().join("file.txt");
    std::fs::write(&src, "data").unwrap();
    let moved = call("move_path", json!({ "src": src, "dst": made })).await;
    assert_eq!(moved["moved"], true);
    let target = made.join("file.txt");
    assert!(target.is_file());

    let exists = call("file_exists", json!({ "path": target })).await;
    assert_eq!(exists["exists"], true);
    assert_eq!(exists["type"], "file");
    assert_eq!(exists["size"], 4);

    let deleted = call("delete_path", json!({ "path": dir.path().join("x") })).await;
    assert_eq!(deleted["type"], "directory");
    let gone = call("file_exists", json!({ "path": target })).await;
    assert_eq!(gone["exists"], false);

    let payload = call("delete_path", json!({ "path": target })).await;
    assert!(payload["error"].as_str().unwrap().contains("Path does not exist"));
}
