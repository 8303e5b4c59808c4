//! User entity - Entità utente con metodi per gestione password

use bcrypt::{DEFAULT_COST, hash, verify};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    /// nome completo, opzionale
    pub display_name: Option<String>,
    pub password: String,
}

impl User {
    /// Verify if target_password matches the stored hashed password
    pub fn verify_password(&self, target_password: &str) -> bool {
        verify(target_password, &self.password).unwrap_or(false)
    }

    /// Hash a password using bcrypt with default cost
    pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
        let hash = hash(password, DEFAULT_COST)?;
        Ok(hash)
    }

    /// Name shown to other users: the full name when set, otherwise the username
    pub fn display_label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}
