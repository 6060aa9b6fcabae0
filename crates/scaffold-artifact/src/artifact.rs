//! Generated files and bundles of them

use crate::hash::ContentHash;
use crate::path::{ArtifactPath, PathError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// File category in the naming plan's manifest
///
/// Each generation stage owns one or more categories and may only emit
/// files listed under them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactCategory {
    Models,
    Services,
    Routes,
    Config,
    Middleware,
}

impl ArtifactCategory {
    /// All categories in manifest order
    pub const ALL: [Self; 5] = [
        Self::Models,
        Self::Services,
        Self::Routes,
        Self::Config,
        Self::Middleware,
    ];

    /// Manifest key
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::Services => "services",
            Self::Routes => "routes",
            Self::Config => "config",
            Self::Middleware => "middleware",
        }
    }
}

impl Display for ArtifactCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated file
///
/// Immutable once built. The hash always matches `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FileDraft")]
pub struct FileArtifact {
    path: ArtifactPath,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    hash: ContentHash,
}

impl FileArtifact {
    /// Build an artifact, hashing its content
    #[must_use]
    pub fn new(path: ArtifactPath, content: impl Into<String>) -> Self {
        let content = content.into();
        let hash = ContentHash::compute(content.as_bytes());
        Self {
            path,
            content,
            description: None,
            hash,
        }
    }

    /// Attach a one-line description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &ArtifactPath {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Whether the stored hash still matches the content
    #[must_use]
    pub fn verify(&self) -> bool {
        self.hash == ContentHash::compute(self.content.as_bytes())
    }
}

/// Wire form of a file as a model emits it
#[derive(Debug, Clone, Deserialize)]
struct FileDraft {
    path: String,
    content: String,
    #[serde(default)]
    description: Option<String>,
}

impl TryFrom<FileDraft> for FileArtifact {
    type Error = ArtifactError;

    fn try_from(draft: FileDraft) -> Result<Self, Self::Error> {
        let path = ArtifactPath::parse(&draft.path).map_err(|source| ArtifactError::InvalidPath {
            raw: draft.path.clone(),
            source,
        })?;
        let artifact = Self::new(path, draft.content);
        Ok(match draft.description {
            Some(d) => artifact.with_description(d),
            None => artifact,
        })
    }
}

/// The file list produced by one stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    files: Vec<FileArtifact>,
}

impl ArtifactBundle {
    #[must_use]
    pub fn new(files: Vec<FileArtifact>) -> Self {
        Self { files }
    }

    #[inline]
    #[must_use]
    pub fn files(&self) -> &[FileArtifact] {
        &self.files
    }

    #[inline]
    #[must_use]
    pub fn into_files(self) -> Vec<FileArtifact> {
        self.files
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Look up a file by path
    #[must_use]
    pub fn get(&self, path: &ArtifactPath) -> Option<&FileArtifact> {
        self.files.iter().find(|f| f.path() == path)
    }

    /// Paths in emission order
    pub fn paths(&self) -> impl Iterator<Item = &ArtifactPath> {
        self.files.iter().map(FileArtifact::path)
    }

    /// Digest over every path and content, in order
    #[must_use]
    pub fn digest(&self) -> ContentHash {
        let mut chunks: Vec<Vec<u8>> = Vec::with_capacity(self.files.len() * 2);
        for file in &self.files {
            chunks.push(file.path().to_string().into_bytes());
            chunks.push(file.content().as_bytes().to_vec());
        }
        ContentHash::compute_chunks(chunks.iter().map(Vec::as_slice))
    }
}

/// Errors building artifacts from model output
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("invalid artifact path '{raw}': {source}")]
    InvalidPath {
        raw: String,
        #[source]
        source: PathError,
    },
}
