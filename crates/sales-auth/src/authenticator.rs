//! Token issuance and verification.
//!
//! An [`Authenticator`] signs with exactly one private key under an active key
//! id, and verifies by resolving the `kid` found in each token header through
//! its [`KeyLookup`]. Only the configured algorithm is accepted during
//! verification and expiry is checked with zero leeway.
//!
//! # Example
//!
//! ```ignore
//! use sales_auth::{Authenticator, Claims, KeyRing, ROLE_USER};
//!
//! let authenticator = Authenticator::builder()
//!     .private_key_pem(&private_pem)?
//!     .active_kid("54bb2165-71e1-41a6-af3e-7da4a0e1e2c1")
//!     .algorithm("RS256")
//!     .key_lookup(KeyRing::from_dir("private/keys")?)
//!     .build()?;
//!
//! let claims = Claims::new(user_id, [ROLE_USER], Utc::now(), Duration::hours(1))?;
//! let token = authenticator.generate_token(&claims)?;
//! let parsed = authenticator.parse_claims(&token)?;
//! ```

use std::fs;
use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header, Validation, decode, encode};
use serde_json::Value;
use tracing::{info, warn};

use sales_config::AuthConfig;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::keys::{KeyLookup, KeyRing, public_key_pem_from_private};

pub struct Authenticator {
    private_key: EncodingKey,
    active_kid: String,
    algorithm: Algorithm,
    lookup: Arc<dyn KeyLookup>,
    validation: Validation,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("active_kid", &self.active_kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct AuthenticatorBuilder {
    private_key: Option<EncodingKey>,
    active_kid: String,
    algorithm: String,
    lookup: Option<Arc<dyn KeyLookup>>,
}

impl AuthenticatorBuilder {
    pub fn private_key(mut self, key: EncodingKey) -> Self {
        self.private_key = Some(key);
        self
    }

    pub fn private_key_pem(self, pem: &[u8]) -> Result<Self, AuthError> {
        let key = EncodingKey::from_rsa_pem(pem)
            .map_err(|e| AuthError::Config(format!("parsing private key: {}", e)))?;
        Ok(self.private_key(key))
    }

    pub fn active_kid(mut self, kid: impl Into<String>) -> Self {
        self.active_kid = kid.into();
        self
    }

    pub fn algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn key_lookup(self, lookup: impl KeyLookup + 'static) -> Self {
        self.shared_key_lookup(Arc::new(lookup))
    }

    /// Uses a lookup that is also held elsewhere, e.g. a [`KeyRing`] rotated
    /// at runtime.
    pub fn shared_key_lookup(mut self, lookup: Arc<dyn KeyLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn build(self) -> Result<Authenticator, AuthError> {
        let private_key = self
            .private_key
            .ok_or_else(|| AuthError::Config("private key cannot be nil".to_string()))?;

        if self.active_kid.trim().is_empty() {
            return Err(AuthError::Config("active kid cannot be blank".to_string()));
        }

        let algorithm = Algorithm::from_str(&self.algorithm)
            .map_err(|_| AuthError::Config(format!("unknown algorithm {:?}", self.algorithm)))?;
        if !is_rsa(algorithm) {
            return Err(AuthError::Config(format!(
                "algorithm {:?} is not an RSA signing algorithm",
                self.algorithm
            )));
        }

        let lookup = self
            .lookup
            .ok_or_else(|| AuthError::Config("public key function cannot be nil".to_string()))?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;

        Ok(Authenticator {
            private_key,
            active_kid: self.active_kid,
            algorithm,
            lookup,
            validation,
        })
    }
}

fn is_rsa(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}

impl Authenticator {
    pub fn builder() -> AuthenticatorBuilder {
        AuthenticatorBuilder::default()
    }

    /// Builds an authenticator from the private key file and public key
    /// directory named in `config`.
    ///
    /// When the key directory has no entry for the active kid, the public half
    /// of the signing key is added so freshly issued tokens verify.
    pub fn from_config(config: &AuthConfig) -> Result<(Self, Arc<KeyRing>), AuthError> {
        let private_pem = fs::read_to_string(&config.private_key_file).map_err(|e| {
            AuthError::Config(format!(
                "reading private key {}: {}",
                config.private_key_file, e
            ))
        })?;

        let ring = match KeyRing::from_dir(&config.keys_dir) {
            Ok(ring) => ring,
            Err(err) => {
                warn!(keys_dir = %config.keys_dir, error = %err, "Starting with an empty key ring");
                KeyRing::new()
            }
        };
        if !config.key_id.trim().is_empty() && !ring.contains(&config.key_id) {
            let public_pem = public_key_pem_from_private(&private_pem)?;
            ring.insert_pem(config.key_id.clone(), public_pem.as_bytes())?;
        }
        let ring = Arc::new(ring);

        let authenticator = Self::builder()
            .private_key_pem(private_pem.as_bytes())?
            .active_kid(config.key_id.clone())
            .algorithm(config.algorithm.clone())
            .shared_key_lookup(ring.clone())
            .build()?;

        info!(
            kid = %authenticator.active_kid,
            algorithm = ?authenticator.algorithm,
            public_keys = ring.kids().len(),
            "Authenticator ready"
        );

        Ok((authenticator, ring))
    }

    pub fn active_kid(&self) -> &str {
        &self.active_kid
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Signs `claims` with the active key, stamping its kid in the header.
    pub fn generate_token(&self, claims: &Claims) -> Result<String, AuthError> {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(self.active_kid.clone());

        encode(&header, claims, &self.private_key).map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verifies `token` and returns its claims.
    pub fn parse_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let kid = header_kid(token)?;

        let key = self.lookup.lookup(&kid).map_err(|err| match err {
            AuthError::UnknownKey(_) => err,
            other => AuthError::UnknownKey(other.to_string()),
        })?;

        let data = decode::<Claims>(token, &key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(data.claims)
    }
}

/// Reads the `kid` from the token header without trusting anything else in it.
fn header_kid(token: &str) -> Result<String, AuthError> {
    let segment = token
        .split('.')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| AuthError::InvalidToken("missing header segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(format!("decoding header: {}", e)))?;
    let header: Value = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::InvalidToken(format!("decoding header: {}", e)))?;

    match header.get("kid") {
        None | Some(Value::Null) => Err(AuthError::MalformedToken(
            "missing key id (kid) in token header".to_string(),
        )),
        Some(Value::String(kid)) => Ok(kid.clone()),
        Some(_) => Err(AuthError::MalformedToken(
            "user token key id (kid) must be string".to_string(),
        )),
    }
}
