//! Mount introspection and KV v2 path rewriting.
//!
//! Operators address secrets by their CLI path (`secret/docker`). The KV v2
//! engine serves the same record from `secret/data/docker`, so the mount is
//! looked up and the path rewritten before every read.

use serde::Deserialize;
use serde_json::Value;

/// Endpoint returning the mount that serves a given path.
pub const MOUNTS_ENDPOINT: &str = "sys/internal/ui/mounts";

/// Outcome of path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// `true` when the path lives on a KV v2 mount
    pub versioned: bool,
    /// Path to read from the logical API
    pub path: String,
}

impl ResolvedPath {
    /// Unversioned, unchanged path. Used whenever introspection fails.
    pub fn passthrough(path: &str) -> Self {
        Self { versioned: false, path: path.to_string() }
    }
}

#[derive(Debug, Deserialize)]
struct MountResponse {
    #[serde(default)]
    data: Option<MountData>,
}

#[derive(Debug, Default, Deserialize)]
struct MountData {
    #[serde(default)]
    options: Option<MountOptions>,
    #[serde(default)]
    path: String,
}

#[derive(Debug, Default, Deserialize)]
struct MountOptions {
    #[serde(default)]
    version: Option<Value>,
}

impl MountData {
    fn version(&self) -> Option<i64> {
        match self.options.as_ref()?.version.as_ref()? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

/// Rewrite `original` according to a mounts response body.
///
/// Non-v2 mounts keep the original path. On v2 mounts `data` is inserted
/// after the mount prefix unless it is already there. A trailing slash is
/// always stripped from the result.
pub fn rewrite_path(body: &[u8], original: &str) -> Result<ResolvedPath, serde_json::Error> {
    let response: MountResponse = serde_json::from_slice(body)?;
    let mount = response.data.unwrap_or_default();

    if mount.version() != Some(2) {
        return Ok(ResolvedPath { versioned: false, path: strip_trailing_slash(original) });
    }

    let prefix = mount.path.as_str();
    let trimmed = strip_trailing_slash(original);

    let rewritten = if is_data_path(prefix, &trimmed) {
        clean(&trimmed)
    } else if original == prefix || trimmed == strip_trailing_slash(prefix) {
        join(&[prefix, "data"])
    } else {
        let rest = original.strip_prefix(prefix).unwrap_or(original);
        join(&[prefix, "data", rest])
    };

    Ok(ResolvedPath { versioned: true, path: strip_trailing_slash(&rewritten) })
}

fn is_data_path(prefix: &str, path: &str) -> bool {
    let data_root = format!("{}/data", prefix.trim_end_matches('/'));
    path == data_root || path.starts_with(&format!("{}/", data_root))
}

fn strip_trailing_slash(path: &str) -> String {
    path.strip_suffix('/').unwrap_or(path).to_string()
}

/// Join non-empty segments with `/` and clean the result.
fn join(parts: &[&str]) -> String {
    let joined = parts.iter().filter(|p| !p.is_empty()).copied().collect::<Vec<_>>().join("/");
    clean(&joined)
}

/// Lexical path cleaning: collapse repeated separators and resolve `.` and
/// `..` segments. A leading `/` is preserved; `..` never climbs above it.
fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
