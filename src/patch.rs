//! Sparse patch operations for REST-style stage updates.

use serde::Serialize;

/// One operation of the gateway's JSON-Pointer-like patch protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Replace,
    Remove,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: String::new(),
        }
    }
}

/// Escape a resource path for use inside a patch pointer.
///
/// `~` must be escaped before `/`, otherwise the `~1` produced for
/// slashes would itself be escaped.
pub fn escape_json_pointer(path: &str) -> String {
    path.replace('~', "~0").replace('/', "~1")
}

/// The pointer segment addressing one method of one resource,
/// `{escapedPath}/{METHOD}`. The gateway expects the segment to be
/// root-relative, so a path without a leading slash gains the `~1`
/// prefix its escaped form would otherwise lack.
pub fn patch_path_for(path: &str, method: &str) -> String {
    let mut escaped = escape_json_pointer(path);
    if !escaped.starts_with("~1") {
        escaped = format!("~1{escaped}");
    }
    format!("{}/{}", escaped, method.to_uppercase())
}
