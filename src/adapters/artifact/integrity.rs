//! Model artifact integrity: signed manifest verification.
//!
//! A manifest (`manifest.json`) beside the artifact binds file names to
//! SHA-256 digests. An optional Ed25519 signature (`model.sig`) over the raw
//! manifest bytes proves who produced it. Use the `sign_model` binary to
//! create both.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ArtifactError;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "model.sig";
pub const MANIFEST_VERSION: u32 = 1;

/// How strictly artifacts are checked before loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityPolicy {
    /// Refuse artifacts without a manifest and a valid signature.
    pub require_signature: bool,

    /// File holding the base64 Ed25519 verifying key.
    pub pubkey_file: Option<PathBuf>,
}

/// Outcome of a successful integrity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// No manifest present; allowed by policy.
    Unverified,
    /// Manifest digests match, no signature present.
    DigestsVerified,
    /// Manifest digests match and the signature is valid.
    Signed,
}

impl std::fmt::Display for IntegrityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unverified => write!(f, "unverified"),
            Self::DigestsVerified => write!(f, "digests verified"),
            Self::Signed => write!(f, "signed"),
        }
    }
}

/// Signed content: file names relative to the manifest and their digests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    pub files: BTreeMap<String, String>,
}

impl ModelManifest {
    /// Build a manifest binding the given files in `dir`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Io` if a file cannot be read.
    pub fn for_files(dir: &Path, names: &[&str]) -> Result<Self, ArtifactError> {
        let mut files = BTreeMap::new();
        for name in names {
            let bytes = fs::read(dir.join(name))
                .map_err(|e| ArtifactError::Io(format!("{name}: {e}")))?;
            files.insert((*name).to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            files,
        })
    }
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for ASCII hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn read_verifying_key(path: &Path) -> Result<VerifyingKey, ArtifactError> {
    let b64 = fs::read_to_string(path)
        .map_err(|e| ArtifactError::Integrity(format!("failed reading public key: {e}")))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ArtifactError::Integrity("public key is not valid base64".into()))?;
    let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        ArtifactError::Integrity("public key must be 32 bytes".into())
    })?;
    VerifyingKey::from_bytes(&key)
        .map_err(|_| ArtifactError::Integrity("invalid Ed25519 public key".into()))
}

fn verify_signature(
    manifest_bytes: &[u8],
    sig_path: &Path,
    policy: &IntegrityPolicy,
) -> Result<(), ArtifactError> {
    let sig_bytes = fs::read(sig_path)
        .map_err(|e| ArtifactError::Integrity(format!("failed reading signature: {e}")))?;
    let sig_bytes: [u8; 64] = sig_bytes.as_slice().try_into().map_err(|_| {
        ArtifactError::Integrity("invalid signature length (expected 64 bytes)".into())
    })?;
    let signature = Signature::from_bytes(&sig_bytes);

    let pubkey_file = policy.pubkey_file.as_deref().ok_or_else(|| {
        ArtifactError::Integrity(
            "artifact is signed but no verifying key is configured".into(),
        )
    })?;
    read_verifying_key(pubkey_file)?
        .verify(manifest_bytes, &signature)
        .map_err(|_| ArtifactError::Integrity("invalid manifest signature".into()))
}

/// Verify the manifest and signature beside `artifact_path`, if any.
///
/// `artifact_bytes` is the content the caller is about to parse; the
/// artifact's digest is taken from it rather than from a second read.
///
/// # Errors
/// Returns `ArtifactError::Integrity` if the policy requires a signature
/// that is missing, a digest does not match, or the signature is invalid.
pub fn verify(
    artifact_path: &Path,
    artifact_bytes: &[u8],
    policy: &IntegrityPolicy,
) -> Result<IntegrityStatus, ArtifactError> {
    let dir = artifact_path.parent().unwrap_or_else(|| Path::new("."));
    let manifest_path = dir.join(MANIFEST_FILE);
    let sig_path = dir.join(SIGNATURE_FILE);

    if !manifest_path.exists() {
        if policy.require_signature {
            return Err(ArtifactError::Integrity(format!(
                "signed manifest required but {MANIFEST_FILE} not found in {dir:?}"
            )));
        }
        tracing::warn!("Loading model artifact without a manifest (integrity unverified)");
        return Ok(IntegrityStatus::Unverified);
    }

    let manifest_bytes = fs::read(&manifest_path)
        .map_err(|e| ArtifactError::Integrity(format!("failed reading manifest: {e}")))?;

    let status = if sig_path.exists() {
        verify_signature(&manifest_bytes, &sig_path, policy)?;
        IntegrityStatus::Signed
    } else if policy.require_signature {
        return Err(ArtifactError::Integrity(format!(
            "signature required but {SIGNATURE_FILE} not found in {dir:?}"
        )));
    } else {
        IntegrityStatus::DigestsVerified
    };

    let manifest: ModelManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| ArtifactError::Integrity(format!("invalid manifest format: {e}")))?;
    if manifest.version != MANIFEST_VERSION {
        return Err(ArtifactError::Integrity(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }

    let artifact_name = artifact_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !manifest.files.contains_key(artifact_name) {
        return Err(ArtifactError::Integrity(format!(
            "manifest does not bind {artifact_name}"
        )));
    }

    for (rel, expected_hex) in &manifest.files {
        let digest = if rel == artifact_name {
            sha256_hex(artifact_bytes)
        } else {
            let bytes = fs::read(dir.join(rel)).map_err(|e| {
                ArtifactError::Integrity(format!("manifest references unreadable file {rel}: {e}"))
            })?;
            sha256_hex(&bytes)
        };
        if !constant_time_eq_str(&digest, expected_hex) {
            return Err(ArtifactError::Integrity(format!("digest mismatch for {rel}")));
        }
    }

    tracing::info!(status = %status, "Model artifact integrity verified");
    Ok(status)
}
