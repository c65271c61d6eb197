use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Position {
    pub id: String,
    #[schema(example = "Sales clerk")]
    pub name: String,
    #[schema(example = 250.0)]
    pub hourly_rate: f64,
}
