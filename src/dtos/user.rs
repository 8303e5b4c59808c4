//! User DTOs - Data Transfer Objects per utenti

use crate::entities::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserDTO {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        // la password non esce mai dal server
        Self {
            id: value.user_id,
            username: value.username,
            display_name: value.display_name,
        }
    }
}

/// DTO per creare un nuovo utente (senza user_id).
/// Arriva in chiaro dalla registrazione, il service sostituisce la password con l'hash.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(length(max = 150))]
    pub display_name: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}
