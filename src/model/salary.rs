use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One payout record per user per calendar month; `amount` is the net value
/// derived from hours, the position rate, bonus and deductions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Salary {
    pub id: String,
    pub user_id: String,
    #[schema(example = 2026)]
    pub year: u16,
    #[schema(example = 3)]
    pub month: u8,
    pub hours_worked: f64,
    pub bonus: f64,
    pub deductions: f64,
    pub amount: f64,
}
