use tracing::debug;

use crate::db::Database;
use crate::error::{DbError, DbResult};
use crate::model::salary::Salary;

/// Derived-value calculations on top of the repositories.
pub struct SalaryService {
    db: Database,
}

impl SalaryService {
    pub fn new(db: Database) -> Self {
        SalaryService { db }
    }

    /// Net monthly amount: hourly pay plus bonus, minus deductions, floored
    /// at zero.
    pub fn net_amount(hourly_rate: f64, hours_worked: f64, bonus: f64, deductions: f64) -> f64 {
        let net = hourly_rate * hours_worked + bonus - deductions;
        if net < 0.0 {
            0.0
        } else {
            net
        }
    }

    /// Looks up the user's current position rate. Users without a position
    /// accrue no hourly pay.
    pub async fn hourly_rate_for(&self, user_id: &str) -> DbResult<f64> {
        let user = self
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))?;

        let rate = match user.position_id {
            Some(position_id) => self
                .db
                .positions()
                .get_by_id(&position_id)
                .await?
                .map(|p| p.hourly_rate)
                .unwrap_or(0.0),
            None => 0.0,
        };

        Ok(rate)
    }

    /// Recomputes and persists the net amount of an existing salary record
    /// from the owner's current position rate.
    pub async fn recalculate(&self, salary_id: &str) -> DbResult<Salary> {
        let mut salary = self
            .db
            .salaries()
            .get_by_id(salary_id)
            .await?
            .ok_or_else(|| DbError::not_found("Salary", salary_id))?;

        let rate = self.hourly_rate_for(&salary.user_id).await?;
        salary.amount =
            Self::net_amount(rate, salary.hours_worked, salary.bonus, salary.deductions);

        debug!(id = %salary.id, amount = salary.amount, "Recalculated salary");

        self.db.salaries().update(&salary).await?;

        Ok(salary)
    }

    /// One seller's sales revenue for a calendar month.
    pub async fn monthly_sales_total(&self, user_id: &str, year: u16, month: u8) -> DbResult<f64> {
        self.db
            .sales()
            .monthly_total_for_user(user_id, year, month)
            .await
    }
}
