//! Public key resolution for token verification.
//!
//! Verification never assumes the signing key: the `kid` in each token header
//! is resolved through a [`KeyLookup`]. [`SimpleKeyLookup`] serves a single
//! key; [`KeyRing`] holds several so retired keys keep verifying until they are
//! removed.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use jsonwebtoken::DecodingKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::{debug, info};

use crate::error::AuthError;

/// Resolves a key identifier to the public key that verifies its tokens.
pub trait KeyLookup: Send + Sync {
    fn lookup(&self, kid: &str) -> Result<DecodingKey, AuthError>;
}

impl<F> KeyLookup for F
where
    F: Fn(&str) -> Result<DecodingKey, AuthError> + Send + Sync,
{
    fn lookup(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self(kid)
    }
}

fn unknown_kid(kid: &str) -> AuthError {
    AuthError::UnknownKey(format!("no public key found for the specified kid: {}", kid))
}

/// Lookup that only knows one key id.
#[derive(Clone)]
pub struct SimpleKeyLookup {
    kid: String,
    key: DecodingKey,
}

impl SimpleKeyLookup {
    pub fn new(kid: impl Into<String>, key: DecodingKey) -> Self {
        Self {
            kid: kid.into(),
            key,
        }
    }
}

impl KeyLookup for SimpleKeyLookup {
    fn lookup(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if kid != self.kid {
            return Err(unknown_kid(kid));
        }
        Ok(self.key.clone())
    }
}

/// Set of public keys indexed by key id.
///
/// Keys can be added and removed while the ring is shared, which is how a
/// running instance picks up a new signing key or drops a retired one.
#[derive(Default)]
pub struct KeyRing {
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `<kid>.pem` public key in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, AuthError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| {
            AuthError::Config(format!("reading key directory {}: {}", dir.display(), e))
        })?;

        let ring = Self::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AuthError::Config(format!("reading key directory entry: {}", e)))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("pem") {
                continue;
            }
            let Some(kid) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let pem = fs::read(&path).map_err(|e| {
                AuthError::Config(format!("reading public key {}: {}", path.display(), e))
            })?;
            ring.insert_pem(kid, &pem)?;
            info!(kid = %kid, "Loaded public key");
        }

        Ok(ring)
    }

    pub fn insert(&self, kid: impl Into<String>, key: DecodingKey) {
        self.write().insert(kid.into(), key);
    }

    pub fn insert_pem(&self, kid: impl Into<String>, pem: &[u8]) -> Result<(), AuthError> {
        let kid = kid.into();
        let key = DecodingKey::from_rsa_pem(pem)
            .map_err(|e| AuthError::Config(format!("parsing public key {}: {}", kid, e)))?;
        self.insert(kid, key);
        Ok(())
    }

    /// Drops a key; tokens signed under it stop verifying.
    pub fn remove(&self, kid: &str) -> bool {
        let removed = self.write().remove(kid).is_some();
        if removed {
            debug!(kid = %kid, "Removed public key");
        }
        removed
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.read().contains_key(kid)
    }

    pub fn kids(&self) -> Vec<String> {
        let mut kids: Vec<String> = self.read().keys().cloned().collect();
        kids.sort();
        kids
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, DecodingKey>> {
        self.keys.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, DecodingKey>> {
        self.keys.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyLookup for KeyRing {
    fn lookup(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self.read().get(kid).cloned().ok_or_else(|| unknown_kid(kid))
    }
}

/// PEM encoded RSA key pair.
pub struct KeyPair {
    /// PKCS#8 private key
    pub private_pem: String,
    /// SubjectPublicKeyInfo public key
    pub public_pem: String,
}

/// Generates a fresh RSA key pair of `bits` size.
pub fn generate_rsa_key_pair(bits: usize) -> Result<KeyPair, AuthError> {
    let mut rng = rand::thread_rng();
    let private = RsaPrivateKey::new(&mut rng, bits)
        .map_err(|e| AuthError::Config(format!("generating key: {}", e)))?;
    encode_key_pair(&private)
}

/// Derives the public key PEM from a PKCS#8 or PKCS#1 private key PEM.
pub fn public_key_pem_from_private(private_pem: &str) -> Result<String, AuthError> {
    let private = RsaPrivateKey::from_pkcs8_pem(private_pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_pem))
        .map_err(|e| AuthError::Config(format!("parsing private key: {}", e)))?;
    Ok(encode_key_pair(&private)?.public_pem)
}

fn encode_key_pair(private: &RsaPrivateKey) -> Result<KeyPair, AuthError> {
    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| AuthError::Config(format!("encoding private key: {}", e)))?
        .to_string();
    let public_pem = RsaPublicKey::from(private)
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| AuthError::Config(format!("encoding public key: {}", e)))?;

    Ok(KeyPair {
        private_pem,
        public_pem,
    })
}
