//! Model signing utility for CardioRisk artifacts.
//!
//! Writes a manifest (`manifest.json`) binding the artifact's SHA-256 digest
//! and an Ed25519 signature over it (`model.sig`) beside the artifact.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_model -- models/heart_disease_model.json [--pubkey-out <file>]
//! ```
//!
//! The base64 32-byte seed is read from the file named by
//! `CARDIORISK_MODEL_SIGNING_KEY_B64_FILE`. Debug builds also accept it
//! directly in `CARDIORISK_MODEL_SIGNING_KEY_B64`. Seed material is
//! zeroized after use.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cardiorisk::adapters::artifact::integrity::{MANIFEST_FILE, SIGNATURE_FILE};
use cardiorisk::adapters::artifact::ModelManifest;

const KEY_FILE_ENV: &str = "CARDIORISK_MODEL_SIGNING_KEY_B64_FILE";
const KEY_ENV: &str = "CARDIORISK_MODEL_SIGNING_KEY_B64";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn non_empty_secret(raw: &str) -> Result<Zeroizing<String>> {
    let secret = Zeroizing::new(raw.trim_end_matches(['\n', '\r']).to_string());
    if secret.is_empty() {
        bail!("Empty signing key");
    }
    Ok(secret)
}

fn read_signing_seed_b64() -> Result<Zeroizing<String>> {
    if let Ok(path) = env::var(KEY_FILE_ENV) {
        let content = Zeroizing::new(
            fs::read_to_string(path.trim()).context("Failed reading signing key file")?,
        );
        return non_empty_secret(&content);
    }

    // Dev-only fallback for convenience.
    if cfg!(debug_assertions) {
        if let Ok(v) = env::var(KEY_ENV) {
            let v = Zeroizing::new(v);
            return non_empty_secret(&v);
        }
    }

    Err(anyhow!(
        "Missing signing key. Set {KEY_FILE_ENV} (the {KEY_ENV} fallback works in debug builds only)."
    ))
}

fn read_signing_seed() -> Result<Seed> {
    let b64 = read_signing_seed_b64()?;
    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(b64.trim())
            .context("Invalid base64 in signing key")?,
    );

    let bytes: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
        anyhow!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        )
    })?;
    Ok(Seed(bytes))
}

fn usage() -> anyhow::Error {
    anyhow!("Usage: sign_model <artifact.json> [--pubkey-out <file>]")
}

fn parse_args() -> Result<(PathBuf, Option<PathBuf>)> {
    let mut args = env::args().skip(1);
    let mut artifact: Option<PathBuf> = None;
    let mut pubkey_out: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--pubkey-out" => pubkey_out = Some(args.next().ok_or_else(usage)?.into()),
            "-h" | "--help" => return Err(usage()),
            _ if artifact.is_none() => artifact = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }

    Ok((artifact.ok_or_else(usage)?, pubkey_out))
}

fn main() -> Result<()> {
    let (artifact, pubkey_out) = parse_args()?;

    if !artifact.is_file() {
        bail!("Model artifact not found at {artifact:?}");
    }
    let dir = artifact.parent().unwrap_or_else(|| Path::new("."));
    let name = artifact
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Artifact file name is not valid UTF-8"))?;

    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest = ModelManifest::for_files(dir, &[name])?;
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest")?;

    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes())
        .with_context(|| format!("Failed to write {sig_path:?}"))?;

    let pubkey_b64 = general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes());

    println!("Signed manifest: {manifest_path:?}");
    println!("Wrote signature: {sig_path:?}");
    match pubkey_out {
        Some(path) => {
            fs::write(&path, &pubkey_b64).with_context(|| format!("Failed to write {path:?}"))?;
            println!("Wrote verifying key: {path:?}");
        }
        None => println!("Verifying key (base64): {pubkey_b64}"),
    }

    Ok(())
}
