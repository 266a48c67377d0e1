use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use sales_auth::generate_rsa_key_pair;

/// Files written by [`keygen`].
#[derive(Debug)]
pub struct GeneratedKeys {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

/// Generates an RSA key pair, writing the private key to `private_key_file`
/// and the public key to `<keys_dir>/<kid>.pem`.
pub fn keygen(
    private_key_file: &Path,
    keys_dir: &Path,
    kid: &str,
    bits: usize,
    force: bool,
) -> anyhow::Result<GeneratedKeys> {
    if kid.trim().is_empty() || kid.contains(['/', '\\']) {
        bail!("key id {:?} cannot be used as a file name", kid);
    }
    if private_key_file.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            private_key_file.display()
        );
    }

    let pair = generate_rsa_key_pair(bits).context("generating key pair")?;

    if let Some(parent) = private_key_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::create_dir_all(keys_dir).with_context(|| format!("creating {}", keys_dir.display()))?;

    let public_key = keys_dir.join(format!("{}.pem", kid));
    fs::write(private_key_file, pair.private_pem.as_bytes())
        .with_context(|| format!("writing {}", private_key_file.display()))?;
    fs::write(&public_key, pair.public_pem.as_bytes())
        .with_context(|| format!("writing {}", public_key.display()))?;

    Ok(GeneratedKeys {
        private_key: private_key_file.to_path_buf(),
        public_key,
    })
}
