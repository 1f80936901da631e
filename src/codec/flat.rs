//! Flat-file form: one member per line, sorted for stable diffs.

use std::fs;
use std::path::Path;

use super::parse_members;
use crate::acl::Members;
use crate::error::CodecError;

/// Encode members one per line, sorted lexicographically by their text.
/// No trailing newline.
pub fn encode_lines<A: Members>(acl: &A) -> String {
    let mut lines: Vec<String> = acl.snapshot().iter().map(ToString::to_string).collect();
    lines.sort();
    lines.join("\n")
}

/// Build a new ACL from newline separated members in any order.
///
/// Lines are taken as written: a blank or padded line is an invalid
/// member. Empty input is the empty ACL, and the last line may carry a
/// terminator (`\n` or `\r\n`).
pub fn decode_lines<A: Members + Default>(input: &str) -> Result<A, CodecError> {
    let body = match input.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => input,
    };
    let members = if body.is_empty() {
        Vec::new()
    } else {
        parse_members(body.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)))?
    };
    let acl = A::default();
    acl.replace(members);
    Ok(acl)
}

/// Read an ACL from a flat file.
pub fn load_file<A: Members + Default>(path: &Path) -> Result<A, CodecError> {
    let content = fs::read_to_string(path)?;
    let acl = decode_lines(&content)?;
    tracing::debug!(path = %path.display(), "Loaded ACL file");
    Ok(acl)
}

/// Write `acl` to a flat file, newline terminated when non-empty.
pub fn dump_file<A: Members>(acl: &A, path: &Path) -> Result<(), CodecError> {
    let mut content = encode_lines(acl);
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "Wrote ACL file");
    Ok(())
}
