//! Password hashing and stored credentials.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

mod harmonist_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn generate_b64_salt() -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    pub fn hash<T: AsRef<str>>(plain: &[u8], b64_salt: T) -> Result<String> {
        let salt = SaltString::from_b64(b64_salt.as_ref()).map_err(|err| anyhow!("{}", err))?;
        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain_pw, &password_hash)
            .is_ok())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum HarmonistHasher {
    Argon2,
}

impl FromStr for HarmonistHasher {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2" => Ok(HarmonistHasher::Argon2),
            _ => bail!("Unknown hasher {}", s),
        }
    }
}

impl fmt::Display for HarmonistHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmonistHasher::Argon2 => write!(f, "argon2"),
        }
    }
}

impl HarmonistHasher {
    pub fn generate_b64_salt(&self) -> String {
        match self {
            HarmonistHasher::Argon2 => harmonist_argon2::generate_b64_salt(),
        }
    }

    pub fn hash<T: AsRef<str>>(&self, plain: &[u8], b64_salt: T) -> Result<String> {
        match self {
            HarmonistHasher::Argon2 => harmonist_argon2::hash(plain, b64_salt),
        }
    }

    pub fn verify<T: AsRef<str>>(&self, plain_pw: &str, target_hash: T) -> Result<bool> {
        match self {
            HarmonistHasher::Argon2 => harmonist_argon2::verify(plain_pw.as_bytes(), target_hash),
        }
    }
}

/// A salted password hash, together with the hasher that produced it.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct HashedPassword {
    pub salt: String,
    pub hash: String,
    pub hasher: HarmonistHasher,
}

impl HashedPassword {
    /// Hashes `plain` with a freshly generated salt.
    pub fn new(plain: &str) -> Result<Self> {
        let hasher = HarmonistHasher::Argon2;
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(plain.as_bytes(), &salt)?;
        Ok(HashedPassword { salt, hash, hasher })
    }

    pub fn verify(&self, plain: &str) -> Result<bool> {
        self.hasher.verify(plain, &self.hash)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct UsernamePasswordCredentials {
    pub user_id: usize,
    pub password: HashedPassword,

    pub created: SystemTime,
    pub last_tried: Option<SystemTime>,
    pub last_used: Option<SystemTime>,
}
