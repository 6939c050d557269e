//! JSON I/O handling for CLI
//!
//! - Input: a single JSON document via stdin
//! - Output: a single JSON object via stdout
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON document from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&json!({
        "status": "ok",
        "data": data
    }))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_value(&json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}

/// Write an error response carrying structured details to stdout
pub fn write_error_details(code: &str, message: &str, details: Value) -> CliResult<()> {
    write_value(&json!({
        "status": "error",
        "code": code,
        "message": message,
        "details": details
    }))
}

fn write_value(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiline_request() {
        let value = parse_request("{\n  \"author\": 1\n}\n").unwrap();
        assert_eq!(value["author"], 1);
    }

    #[test]
    fn test_parse_empty_request() {
        let err = parse_request("  \n").unwrap_err();
        assert_eq!(err.message(), "Empty input");
    }
}
