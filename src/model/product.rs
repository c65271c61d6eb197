use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub id: String,
    #[schema(example = "Coffee beans 1kg")]
    pub name: String,
    #[schema(example = 18.5)]
    pub price: f64,
    pub category_id: String,
}
