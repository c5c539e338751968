//! Argon2id password hashing. Records are self-describing PHC strings, so
//! changing the configured cost only affects newly hashed passwords.

use crate::models::account::PasswordRecord;
use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Fixed salt for the dummy hash computed when a username is unknown.
const DUMMY_SALT: &str = "YXV0aHN0b3JlZHVtbXlzYWx0";

fn hasher(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

/// Hash `password` with a fresh random salt.
pub fn hash_new(password: &str, params: &Params) -> Result<PasswordRecord, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = hasher(params)
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(PasswordRecord { phc })
}

/// Check `password` against a stored record. `Err` only when the record
/// itself cannot be parsed.
pub fn verify(password: &str, record: &PasswordRecord) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(&record.phc)?;
    // Cost parameters come from the PHC string, not from the hasher.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Burn the same work as a real verification so unknown usernames are not
/// distinguishable by timing.
pub fn verify_dummy(password: &str, params: &Params) {
    if let Ok(salt) = SaltString::from_b64(DUMMY_SALT) {
        let _ = hasher(params).hash_password(password.as_bytes(), &salt);
    }
}

#[cfg(test)]
pub(crate) fn cheap_params() -> Params {
    Params::new(64, 1, 1, None).unwrap()
}
