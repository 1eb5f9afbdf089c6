//! Result payload normalization.
//!
//! The engines return a succeeded task's outputs either as a plain list of
//! location strings or as a list of structured objects carrying a
//! `fileUrl` field, depending on engine and effect type. Both shapes
//! unify into an ordered list of canonical [`ArtifactRef`]s here, at the
//! adapter boundary.

use serde::{Deserialize, Serialize};

/// Canonical pointer to one produced output of a succeeded task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactRef(pub String);

impl ArtifactRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raw output entry as the engines serialize it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawArtifact {
    /// Bare location string.
    Url(String),
    /// Structured object with the location in `fileUrl`.
    #[serde(rename_all = "camelCase")]
    Object { file_url: String },
}

/// Unify a raw output list into the canonical ordered artifact list.
pub fn normalize_artifacts(raw: Vec<RawArtifact>) -> Vec<ArtifactRef> {
    raw.into_iter()
        .map(|artifact| match artifact {
            RawArtifact::Url(url) => ArtifactRef(url),
            RawArtifact::Object { file_url } => ArtifactRef(file_url),
        })
        .collect()
}
