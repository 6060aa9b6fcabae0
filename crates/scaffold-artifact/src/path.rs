//! Normalized relative file paths
//!
//! Model output names files with whatever spelling it likes: `./src/app.js`,
//! `src\\models\\user.js`, `src//routes/posts.js`. [`ArtifactPath`] reduces all
//! of these to one canonical `/`-separated form so manifest membership is a
//! plain equality check, and rejects anything that could escape the output
//! directory.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Relative path of a generated file
///
/// # Invariants
/// - At least one segment
/// - No empty, `.` or `..` segments
/// - Never absolute
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactPath(Vec<String>);

impl ArtifactPath {
    /// Parse and normalize a path string
    ///
    /// # Errors
    /// Returns [`PathError`] if the path is empty, absolute, or climbs
    /// out of its root with `..`.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }

        let unified = trimmed.replace('\\', "/");
        if unified.starts_with('/') || has_drive_prefix(&unified) {
            return Err(PathError::Absolute(raw.to_string()));
        }

        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(PathError::ParentTraversal(raw.to_string())),
                s => segments.push(s.to_string()),
            }
        }

        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self(segments))
    }

    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Final segment, e.g. `user.js`
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    /// File name without its last extension, e.g. `user` for `user.js`
    /// and `user.service` for `user.service.ts`
    #[must_use]
    pub fn stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(idx) => &name[..idx],
        }
    }

    /// Last extension without the dot
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Directory part, `None` for a bare file name
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() > 1 {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    /// Whether this path lives under `dir` (segment-wise)
    #[must_use]
    pub fn starts_with(&self, dir: &Self) -> bool {
        dir.0.len() < self.0.len() && self.0[..dir.0.len()] == dir.0[..]
    }

    /// Resolve onto a filesystem root
    #[must_use]
    pub fn to_path_under(&self, root: &std::path::Path) -> std::path::PathBuf {
        self.0.iter().fold(root.to_path_buf(), |acc, seg| acc.join(seg))
    }
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl Display for ArtifactPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl FromStr for ArtifactPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ArtifactPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ArtifactPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Path normalization failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("absolute paths are not allowed: {0}")]
    Absolute(String),

    #[error("path escapes its root: {0}")]
    ParentTraversal(String),
}
