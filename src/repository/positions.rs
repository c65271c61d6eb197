use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::model::position::Position;

pub struct NewPosition {
    pub name: String,
    pub hourly_rate: f64,
}

#[derive(Debug, Clone)]
pub struct PositionsRepository {
    pool: SqlitePool,
}

impl PositionsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PositionsRepository { pool }
    }

    pub async fn get_all(&self) -> DbResult<Vec<Position>> {
        let positions = sqlx::query_as::<_, Position>(
            "SELECT id, name, hourly_rate FROM positions ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(positions)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Position>> {
        let position = sqlx::query_as::<_, Position>(
            "SELECT id, name, hourly_rate FROM positions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(position)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Position>> {
        let position = sqlx::query_as::<_, Position>(
            "SELECT id, name, hourly_rate FROM positions WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(position)
    }

    pub async fn insert(&self, new: NewPosition) -> DbResult<Position> {
        let position = Position {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            hourly_rate: new.hourly_rate,
        };

        debug!(name = %position.name, "Inserting position");

        sqlx::query("INSERT INTO positions (id, name, hourly_rate) VALUES (?, ?, ?)")
            .bind(&position.id)
            .bind(&position.name)
            .bind(position.hourly_rate)
            .execute(&self.pool)
            .await?;

        Ok(position)
    }

    pub async fn update(&self, position: &Position) -> DbResult<()> {
        let result = sqlx::query("UPDATE positions SET name = ?, hourly_rate = ? WHERE id = ?")
            .bind(&position.name)
            .bind(position.hourly_rate)
            .bind(&position.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Position", &position.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM positions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Position", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[actix_web::test]
    async fn crud_roundtrip() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.positions();

        let inserted = repo
            .insert(NewPosition {
                name: "Cashier".to_string(),
                hourly_rate: 120.0,
            })
            .await
            .unwrap();

        let mut fetched = repo.get_by_name("Cashier").await.unwrap().unwrap();
        assert_eq!(fetched.id, inserted.id);

        let before = repo.get_all().await.unwrap().len();
        fetched.hourly_rate = 130.0;
        repo.update(&fetched).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), before);

        repo.delete(&fetched.id).await.unwrap();
        assert!(repo.get_by_id(&fetched.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn deleting_a_position_keeps_its_users() {
        let db = Database::in_memory().await.unwrap();

        let position = db
            .positions()
            .insert(NewPosition {
                name: "Cashier".to_string(),
                hourly_rate: 120.0,
            })
            .await
            .unwrap();

        let user = db
            .users()
            .insert(crate::repository::users::NewUser {
                username: "jdoe".to_string(),
                password: "hash".to_string(),
                full_name: "Test User".to_string(),
                role_id: crate::model::role::Role::User.id(),
                position_id: Some(position.id.clone()),
            })
            .await
            .unwrap();

        db.positions().delete(&position.id).await.unwrap();

        // FK is SET NULL: the user survives without a position.
        let user = db.users().get_by_id(&user.id).await.unwrap().unwrap();
        assert!(user.position_id.is_none());
    }
}
