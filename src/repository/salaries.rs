use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::model::salary::Salary;

pub struct NewSalary {
    pub user_id: String,
    pub year: u16,
    pub month: u8,
    pub hours_worked: f64,
    pub bonus: f64,
    pub deductions: f64,
    pub amount: f64,
}

#[derive(Debug, Clone)]
pub struct SalariesRepository {
    pool: SqlitePool,
}

impl SalariesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalariesRepository { pool }
    }

    pub async fn get_all(&self) -> DbResult<Vec<Salary>> {
        let salaries = sqlx::query_as::<_, Salary>(
            "SELECT id, user_id, year, month, hours_worked, bonus, deductions, amount
             FROM salaries ORDER BY year DESC, month DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(salaries)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Salary>> {
        let salary = sqlx::query_as::<_, Salary>(
            "SELECT id, user_id, year, month, hours_worked, bonus, deductions, amount
             FROM salaries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(salary)
    }

    /// At most one row exists per (user, year, month); enforced by a UNIQUE
    /// constraint.
    pub async fn get_by_date(
        &self,
        user_id: &str,
        year: u16,
        month: u8,
    ) -> DbResult<Option<Salary>> {
        let salary = sqlx::query_as::<_, Salary>(
            "SELECT id, user_id, year, month, hours_worked, bonus, deductions, amount
             FROM salaries WHERE user_id = ? AND year = ? AND month = ?",
        )
        .bind(user_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(salary)
    }

    pub async fn get_for_user(&self, user_id: &str) -> DbResult<Vec<Salary>> {
        let salaries = sqlx::query_as::<_, Salary>(
            "SELECT id, user_id, year, month, hours_worked, bonus, deductions, amount
             FROM salaries WHERE user_id = ? ORDER BY year DESC, month DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(salaries)
    }

    pub async fn insert(&self, new: NewSalary) -> DbResult<Salary> {
        let salary = Salary {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            year: new.year,
            month: new.month,
            hours_worked: new.hours_worked,
            bonus: new.bonus,
            deductions: new.deductions,
            amount: new.amount,
        };

        debug!(user_id = %salary.user_id, year = salary.year, month = salary.month, "Inserting salary");

        sqlx::query(
            "INSERT INTO salaries (id, user_id, year, month, hours_worked, bonus, deductions, amount)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&salary.id)
        .bind(&salary.user_id)
        .bind(salary.year)
        .bind(salary.month)
        .bind(salary.hours_worked)
        .bind(salary.bonus)
        .bind(salary.deductions)
        .bind(salary.amount)
        .execute(&self.pool)
        .await?;

        Ok(salary)
    }

    pub async fn update(&self, salary: &Salary) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE salaries
             SET user_id = ?, year = ?, month = ?, hours_worked = ?, bonus = ?, deductions = ?, amount = ?
             WHERE id = ?",
        )
        .bind(&salary.user_id)
        .bind(salary.year)
        .bind(salary.month)
        .bind(salary.hours_worked)
        .bind(salary.bonus)
        .bind(salary.deductions)
        .bind(salary.amount)
        .bind(&salary.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Salary", &salary.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM salaries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Salary", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::model::role::Role;
    use crate::repository::users::NewUser;

    async fn user(db: &Database) -> String {
        db.users()
            .insert(NewUser {
                username: "jdoe".to_string(),
                password: "hash".to_string(),
                full_name: "Test User".to_string(),
                role_id: Role::User.id(),
                position_id: None,
            })
            .await
            .unwrap()
            .id
    }

    fn new_salary(user_id: &str, year: u16, month: u8) -> NewSalary {
        NewSalary {
            user_id: user_id.to_string(),
            year,
            month,
            hours_worked: 160.0,
            bonus: 0.0,
            deductions: 0.0,
            amount: 40_000.0,
        }
    }

    #[actix_web::test]
    async fn insert_and_lookup_by_date() {
        let db = Database::in_memory().await.unwrap();
        let user_id = user(&db).await;
        let repo = db.salaries();

        let inserted = repo.insert(new_salary(&user_id, 2026, 3)).await.unwrap();

        let by_date = repo.get_by_date(&user_id, 2026, 3).await.unwrap().unwrap();
        assert_eq!(by_date.id, inserted.id);
        assert!(repo.get_by_date(&user_id, 2026, 4).await.unwrap().is_none());

        let for_user = repo.get_for_user(&user_id).await.unwrap();
        assert_eq!(for_user.len(), 1);
    }

    #[actix_web::test]
    async fn one_salary_per_user_per_month() {
        let db = Database::in_memory().await.unwrap();
        let user_id = user(&db).await;
        let repo = db.salaries();

        repo.insert(new_salary(&user_id, 2026, 3)).await.unwrap();
        let err = repo.insert(new_salary(&user_id, 2026, 3)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // A different month is fine.
        repo.insert(new_salary(&user_id, 2026, 4)).await.unwrap();
    }

    #[actix_web::test]
    async fn update_and_delete() {
        let db = Database::in_memory().await.unwrap();
        let user_id = user(&db).await;
        let repo = db.salaries();

        let mut salary = repo.insert(new_salary(&user_id, 2026, 3)).await.unwrap();
        let before = repo.get_all().await.unwrap().len();

        salary.bonus = 500.0;
        repo.update(&salary).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), before);
        assert_eq!(
            repo.get_by_id(&salary.id).await.unwrap().unwrap().bonus,
            500.0
        );

        repo.delete(&salary.id).await.unwrap();
        assert!(repo.get_by_id(&salary.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn deleting_the_user_cascades_salaries() {
        let db = Database::in_memory().await.unwrap();
        let user_id = user(&db).await;

        let salary = db
            .salaries()
            .insert(new_salary(&user_id, 2026, 3))
            .await
            .unwrap();

        db.users().delete(&user_id).await.unwrap();
        assert!(db
            .salaries()
            .get_by_id(&salary.id)
            .await
            .unwrap()
            .is_none());
    }
}
