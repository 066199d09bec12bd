use std::sync::OnceLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};
use rand_core::OsRng;
use tracing::warn;

/// Argon2id PHC string plus the per-user salt it was derived with.
pub struct SaltedHash {
    pub hash: String,
    pub salt: String,
}

/// Hash with a freshly generated random salt.
pub fn hash_password(password: &str) -> Result<SaltedHash, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(SaltedHash {
        hash,
        salt: salt.as_str().to_string(),
    })
}

/// Recompute the hash of `password` under the stored salt and compare it
/// with the stored hash. The output comparison is constant-time.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Unparseable stored password hash: {}", e);
            return false;
        }
    };

    if parsed.salt.map(|s| s.as_str()) != Some(salt) {
        warn!("Stored salt does not match the salt embedded in the hash");
        return false;
    }

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Spend the same work as a real verification, for logins naming an
/// unknown user.
pub fn verify_dummy(password: &str) {
    static DUMMY: OnceLock<Option<SaltedHash>> = OnceLock::new();

    if let Some(dummy) = DUMMY.get_or_init(|| hash_password("family-organiser-dummy").ok()) {
        let _ = verify_password(password, &dummy.hash, &dummy.salt);
    }
}
