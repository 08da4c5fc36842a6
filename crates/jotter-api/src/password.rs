use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{self, SaltString},
};
use rand_core::OsRng;
use tracing::warn;

/// Argon2id hashing with a fixed cost configuration.
pub struct Passwords {
    argon2: Argon2<'static>,
    /// Verified against when the username is unknown, so a miss costs the
    /// same as a wrong password.
    dummy_hash: String,
}

impl Passwords {
    pub fn new(params: Params) -> Result<Self, password_hash::Error> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "jotter-unknown-user")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// PHC-formatted hash with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, password_hash::Error> {
        hash_with(&self.argon2, password)
    }

    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is unreadable: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Passwords {
        Passwords::new(Params::new(8, 1, 1, None).unwrap()).unwrap()
    }

    #[test]
    fn hash_is_not_the_plaintext_and_verifies() {
        let passwords = cheap();
        let hash = passwords.hash("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(hash.starts_with("$argon2id$"));
        assert!(passwords.verify("correct horse", &hash));
        assert!(!passwords.verify("battery staple", &hash));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let passwords = cheap();
        assert_ne!(passwords.hash("pw").unwrap(), passwords.hash("pw").unwrap());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!cheap().verify("pw", "plaintext-from-an-old-import"));
    }
}
