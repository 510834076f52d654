//! bcrypt hashing for login passwords and refresh-token secrets.
//!
//! bcrypt embeds salt and cost in the hash string, so the cost factor can
//! be raised later without invalidating already-stored hashes. Both hash
//! and verify are deliberately slow, so they run on the blocking thread
//! pool rather than stalling the async runtime.

use std::fmt;

/// Newtype for plaintext secrets to prevent accidental logging.
#[derive(Clone)]
pub struct Password(String);

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Newtype for stored hashes.
#[derive(Clone)]
pub struct PasswordHashString(String);

impl fmt::Debug for PasswordHashString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHashString(<redacted>)")
    }
}

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a secret with bcrypt at the given cost factor.
pub async fn hash_password(
    password: &Password,
    cost: u32,
) -> Result<PasswordHashString, anyhow::Error> {
    let plain = password.0.clone();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Hashing task failed: {}", e))?
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(PasswordHashString(hash))
}

/// Verify a secret against a stored bcrypt hash.
///
/// Returns Ok(false) on mismatch; Err only for malformed hashes.
pub async fn verify_password(
    password: &Password,
    password_hash: &PasswordHashString,
) -> Result<bool, anyhow::Error> {
    let plain = password.0.clone();
    let hash = password_hash.0.clone();
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| anyhow::anyhow!("Verification task failed: {}", e))?
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the tests fast
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_is_not_plaintext() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hash_password(&password, TEST_COST).await.unwrap();

        assert_ne!(hash.as_str(), password.as_str());
        assert!(hash.as_str().starts_with("$2"));
    }

    #[tokio::test]
    async fn correct_password_verifies() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hash_password(&password, TEST_COST).await.unwrap();

        assert!(verify_password(&password, &hash).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_fails_verification() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = hash_password(&password, TEST_COST).await.unwrap();

        let wrong = Password::new("wrongPassword".to_string());
        assert!(!verify_password(&wrong, &hash).await.unwrap());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash = PasswordHashString::new("$2b$04$abcdefghijklmnopqrstuv".to_string());

        let password_dbg = format!("{:?}", password);
        let hash_dbg = format!("{:?}", hash);
        assert!(!password_dbg.contains("mySecurePassword123"));
        assert!(!hash_dbg.contains("$2b$"));
        assert!(password_dbg.contains("redacted"));
        assert!(hash_dbg.contains("redacted"));
    }

    #[tokio::test]
    async fn same_password_produces_distinct_hashes() {
        let password = Password::new("mySecurePassword123".to_string());
        let hash1 = hash_password(&password, TEST_COST).await.unwrap();
        let hash2 = hash_password(&password, TEST_COST).await.unwrap();

        // Random salt per hash
        assert_ne!(hash1.as_str(), hash2.as_str());
        assert!(verify_password(&password, &hash1).await.unwrap());
        assert!(verify_password(&password, &hash2).await.unwrap());
    }
}
