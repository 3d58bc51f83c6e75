use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::ArtifactError;

/// blake3 digest of an artifact's bytes, hex encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, enough to tell deployments apart in logs.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an artifact came from and what exactly was loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactSource {
    /// `None` when the artifact was built in memory rather than read from disk.
    pub path: Option<PathBuf>,
    pub fingerprint: Fingerprint,
}

impl ArtifactSource {
    pub fn in_memory(bytes: &[u8]) -> Self {
        Self { path: None, fingerprint: Fingerprint::of(bytes) }
    }

    /// Compares the bytes currently on disk against the fingerprint taken at load.
    pub fn matches(&self, bytes: &[u8]) -> bool {
        Fingerprint::of(bytes) == self.fingerprint
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<(T, ArtifactSource), ArtifactError> {
    let bytes = fs::read(path)
        .map_err(|source| ArtifactError::ReadFile { path: path.to_path_buf(), source })?;
    let value = serde_json::from_slice(&bytes)
        .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })?;

    let source =
        ArtifactSource { path: Some(path.to_path_buf()), fingerprint: Fingerprint::of(&bytes) };
    Ok((value, source))
}
