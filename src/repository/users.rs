use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::model::user::User;

pub struct NewUser {
    pub username: String,
    /// Already hashed by the caller.
    pub password: String,
    pub full_name: String,
    pub role_id: u8,
    pub position_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UsersRepository {
    pool: SqlitePool,
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UsersRepository { pool }
    }

    pub async fn get_all(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password, full_name, role_id, position_id
             FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, full_name, role_id, position_id
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, full_name, role_id, position_id
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn insert(&self, new: NewUser) -> DbResult<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new.username,
            password: new.password,
            full_name: new.full_name,
            role_id: new.role_id,
            position_id: new.position_id,
        };

        debug!(username = %user.username, "Inserting user");

        sqlx::query(
            "INSERT INTO users (id, username, password, full_name, role_id, position_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.full_name)
        .bind(user.role_id)
        .bind(&user.position_id)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, "Updating user");

        let result = sqlx::query(
            "UPDATE users
             SET username = ?, password = ?, full_name = ?, role_id = ?, position_id = ?
             WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.full_name)
        .bind(user.role_id)
        .bind(&user.position_id)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", &user.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::model::role::Role;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "hash".to_string(),
            full_name: "Test User".to_string(),
            role_id: Role::User.id(),
            position_id: None,
        }
    }

    #[actix_web::test]
    async fn insert_assigns_key_and_roundtrips() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.users();

        let inserted = repo.insert(new_user("jdoe")).await.unwrap();
        assert!(!inserted.id.is_empty());

        let fetched = repo.get_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "jdoe");

        let by_name = repo.get_by_username("jdoe").await.unwrap().unwrap();
        assert_eq!(by_name.id, inserted.id);
    }

    #[actix_web::test]
    async fn update_is_in_place() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.users();

        let mut user = repo.insert(new_user("jdoe")).await.unwrap();
        let before = repo.get_all().await.unwrap().len();

        user.full_name = "Renamed".to_string();
        repo.update(&user).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap().len(), before);
        let fetched = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched.full_name, "Renamed");
    }

    #[actix_web::test]
    async fn delete_then_get_is_absent() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.users();

        let user = repo.insert(new_user("jdoe")).await.unwrap();
        repo.delete(&user.id).await.unwrap();

        assert!(repo.get_by_id(&user.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(&user.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[actix_web::test]
    async fn duplicate_username_is_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.users();

        repo.insert(new_user("jdoe")).await.unwrap();
        let err = repo.insert(new_user("jdoe")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
