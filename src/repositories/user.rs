//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Read};
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use sqlx::{Error, SqlitePool};
use tracing::instrument;

const USER_COLUMNS: &str = "user_id, username, display_name, password";

// USER REPO
pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// considero l'username univoco
    /// Find user by exact username match
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    /// `data.password` deve essere già hashata
    #[instrument(skip(self, data), fields(username = %data.username))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, display_name, password) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(&data.username)
        .bind(&data.display_name)
        .bind(&data.password)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
