use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Join entity for the Sale <-> Product many-to-many relationship.
/// Composite key (sale_id, product_id); rows live and die with their sale.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SaleProduct {
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Price snapshot at the time of sale.
    pub unit_price: f64,
}
