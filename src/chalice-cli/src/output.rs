//! Printing helpers shared by the command modules.

use std::process::ExitCode;

use anyhow::Result;
use serde_json::Value;

/// Whether a payload reports a failure: an `error` key, or `success: false`.
pub fn is_failure(payload: &Value) -> bool {
    payload.get("error").is_some() || payload.get("success") == Some(&Value::Bool(false))
}

/// Pretty-print a JSON payload to stdout and map it to an exit code.
pub fn print_payload(payload: &Value) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(if is_failure(payload) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Parse a `--args` value into a JSON object. Absent means `{}`.
pub fn parse_args_json(raw: Option<&str>) -> Result<Value> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Value::Object(Default::default()));
    };
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("--args is not valid JSON: {e}"))?;
    if !value.is_object() {
        anyhow::bail!("--args must be a JSON object");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_failure() {
        assert!(is_failure(&json!({"error": "x"})));
        assert!(is_failure(&json!({"success": false, "stdout": ""})));
        assert!(!is_failure(&json!({"success": true})));
        assert!(!is_failure(&json!({"files": []})));
    }

    #[test]
    fn test_parse_args_json() {
        assert_eq!(parse_args_json(None).unwrap(), json!({}));
        assert_eq!(parse_args_json(Some(" ")).unwrap(), json!({}));
        assert_eq!(parse_args_json(Some(r#"{"a":1}"#)).unwrap(), json!({"a": 1}));
        assert!(parse_args_json(Some("[1]")).is_err());
        assert!(parse_args_json(Some("{oops")).is_err());
    }
}
