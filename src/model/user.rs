use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 hash, never the plain password.
    pub password: String,
    pub full_name: String,
    pub role_id: u8,
    pub position_id: Option<String>,
}
