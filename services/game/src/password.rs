//! Password hashing

use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{self, SaltString},
};

/// Hash a password into a PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash checked when a login names an account that does not exist
static ABSENT_ACCOUNT_HASH: LazyLock<Result<String, password_hash::Error>> =
    LazyLock::new(|| hash_password("absent-account"));

/// Check a password against an account's stored hash
///
/// Without an account the password is still verified against a fixed hash,
/// so both outcomes cost the same Argon2 work, and the result is `false`.
pub fn verify_credentials(
    password: &str,
    password_hash: Option<&str>,
) -> Result<bool, password_hash::Error> {
    match password_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            let hash = ABSENT_ACCOUNT_HASH.as_deref().map_err(|e| *e)?;
            verify_password(password, hash)?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("p").unwrap();
        assert_ne!(hash, "p");
        assert!(verify_password("p", &hash).unwrap());
        assert!(!verify_password("P", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        assert_ne!(hash_password("p").unwrap(), hash_password("p").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(verify_password("p", "plaintext").is_err());
    }

    #[test]
    fn test_missing_account_never_verifies() {
        assert!(!verify_credentials("absent-account", None).unwrap());
        assert!(!verify_credentials("p", None).unwrap());

        let hash = hash_password("p").unwrap();
        assert!(verify_credentials("p", Some(&hash)).unwrap());
    }

    fn fastest_of_three(f: impl Fn()) -> Duration {
        (0..3)
            .map(|_| {
                let start = Instant::now();
                f();
                start.elapsed()
            })
            .min()
            .unwrap()
    }

    #[test]
    fn test_missing_account_costs_a_full_verification() {
        let hash = hash_password("right").unwrap();
        // warm up the fixed hash
        verify_credentials("wrong", None).unwrap();

        let known = fastest_of_three(|| {
            verify_credentials("wrong", Some(&hash)).unwrap();
        });
        let absent = fastest_of_three(|| {
            verify_credentials("wrong", None).unwrap();
        });

        assert!(
            absent * 4 >= known,
            "absent account took {:?}, known account {:?}",
            absent,
            known
        );
    }
}
