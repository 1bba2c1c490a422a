//! Decode structured extractions produced by a vision model.
//!
//! Model output is often wrapped in Markdown fences and sometimes cut off
//! mid-document when the response hits its token limit.

use anyhow::{Context, Result};

use crate::types::StructuredExtraction;

impl StructuredExtraction {
    /// Decode a JSON extraction, tolerating code fences and truncation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let body = strip_code_fences(raw);
        match serde_json::from_str(body) {
            Ok(extraction) => Ok(extraction),
            Err(first) => {
                let repaired = repair_truncated_json(body);
                log::debug!("extraction did not decode ({first}), retrying after repair");
                serde_json::from_str(&repaired).context("decode structured extraction")
            }
        }
    }
}

/// Remove a surrounding ```json ... ``` (or bare ```) fence.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Drop the info string (`json`) up to the first newline.
        s = rest.split_once('\n').map_or("", |(_, body)| body);
    }
    if let Some(rest) = s.trim_end().strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Close whatever a truncated JSON document left open: an unterminated
/// string, then any open arrays/objects in reverse nesting order. A dangling
/// comma or key separator before the cut is dropped.
pub fn repair_truncated_json(body: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in body.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = body.to_string();
    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }

    loop {
        let trimmed = out.trim_end();
        if let Some(rest) = trimmed.strip_suffix(',') {
            out = rest.to_string();
        } else if let Some(rest) = trimmed.strip_suffix(':') {
            // `"key":` with no value: complete it with null.
            out = format!("{rest}: null");
            break;
        } else {
            out.truncate(trimmed.len());
            break;
        }
    }

    while let Some(close) = stack.pop() {
        out.push(close);
    }
    out
}
