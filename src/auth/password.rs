use base64::{engine::general_purpose, Engine as _};
use constant_time_eq::constant_time_eq;
use pbkdf2::{hmac::Hmac, pbkdf2};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_PREFIX: &str = "pbkdf2_sha256";

fn derive(password: &str, salt: &str, iterations: u32) -> AppResult<String> {
    let mut output = [0u8; 32];
    pbkdf2::<Hmac<Sha256>>(password.as_bytes(), salt.as_bytes(), iterations, &mut output)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))?;
    Ok(general_purpose::STANDARD.encode(output))
}

/// Hashes a password into `pbkdf2_sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = Uuid::new_v4().simple().to_string();
    let hash = derive(password, &salt, PBKDF2_ITERATIONS)?;
    Ok(format!(
        "{}${}${}${}",
        HASH_PREFIX, PBKDF2_ITERATIONS, salt, hash
    ))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != HASH_PREFIX {
        return false;
    }

    let iterations: u32 = match parts[1].parse() {
        Ok(i) => i,
        Err(_) => return false,
    };

    match derive(password, parts[2], iterations) {
        Ok(computed) => constant_time_eq(computed.as_bytes(), parts[3].as_bytes()),
        Err(_) => false,
    }
}

/// SHA-256 hex digest used to store one-time tokens at rest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
