use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::model::sale::{Sale, SaleWithLines};
use crate::model::sale_product::SaleProduct;

pub struct NewSaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Optional list filters for sales.
#[derive(Debug, Default)]
pub struct SaleFilter {
    pub user_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
}

impl SalesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalesRepository { pool }
    }

    // Dates are bound as DateTime values so they compare in the same text
    // format the driver stores.
    fn where_clause(filter: &SaleFilter) -> String {
        let mut conditions = Vec::new();

        if filter.user_id.is_some() {
            conditions.push("user_id = ?");
        }
        if filter.from.is_some() {
            conditions.push("date_added >= ?");
        }
        if filter.to.is_some() {
            conditions.push("date_added <= ?");
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        }
    }

    pub async fn get_all(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT id, user_id, date_added FROM sales ORDER BY date_added DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    pub async fn list(&self, filter: &SaleFilter, limit: i64, offset: i64) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT id, user_id, date_added FROM sales {} ORDER BY date_added DESC LIMIT ? OFFSET ?",
            Self::where_clause(filter)
        );
        debug!(sql = %sql, "Listing sales");

        let mut query = sqlx::query_as::<_, Sale>(&sql);
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id);
        }
        if let Some(from) = filter.from {
            query = query.bind(from);
        }
        if let Some(to) = filter.to {
            query = query.bind(to);
        }

        let sales = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(sales)
    }

    pub async fn count(&self, filter: &SaleFilter) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM sales {}", Self::where_clause(filter));

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(user_id) = &filter.user_id {
            query = query.bind(user_id);
        }
        if let Some(from) = filter.from {
            query = query.bind(from);
        }
        if let Some(to) = filter.to {
            query = query.bind(to);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    /// Fetches the sale row alone; line items are loaded only through the
    /// explicit `get_with_lines` / `get_lines` operations.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale =
            sqlx::query_as::<_, Sale>("SELECT id, user_id, date_added FROM sales WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(sale)
    }

    /// Timestamp uniqueness is assumed, not enforced; the first match wins.
    pub async fn get_by_date(&self, date_added: DateTime<Utc>) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, user_id, date_added FROM sales WHERE date_added = ? LIMIT 1",
        )
        .bind(date_added)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    pub async fn get_with_lines(&self, id: &str) -> DbResult<Option<SaleWithLines>> {
        let sale = match self.get_by_id(id).await? {
            Some(sale) => sale,
            None => return Ok(None),
        };

        let lines = self.get_lines(id).await?;

        Ok(Some(SaleWithLines { sale, lines }))
    }

    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleProduct>> {
        let lines = sqlx::query_as::<_, SaleProduct>(
            "SELECT sale_id, product_id, quantity, unit_price
             FROM sale_products WHERE sale_id = ? ORDER BY product_id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Inserts the sale and all of its line items in one transaction.
    pub async fn create(
        &self,
        user_id: &str,
        date_added: DateTime<Utc>,
        lines: &[NewSaleLine],
    ) -> DbResult<Sale> {
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date_added,
        };

        debug!(id = %sale.id, lines = lines.len(), "Creating sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO sales (id, user_id, date_added) VALUES (?, ?, ?)")
            .bind(&sale.id)
            .bind(&sale.user_id)
            .bind(sale.date_added)
            .execute(&mut *tx)
            .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO sale_products (sale_id, product_id, quantity, unit_price)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(sale)
    }

    pub async fn update(&self, sale: &Sale) -> DbResult<()> {
        let result = sqlx::query("UPDATE sales SET user_id = ?, date_added = ? WHERE id = ?")
            .bind(&sale.user_id)
            .bind(sale.date_added)
            .bind(&sale.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        Ok(())
    }

    /// Line items go with the sale (ON DELETE CASCADE).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Revenue of one seller over a calendar month, summed over line items.
    pub async fn monthly_total_for_user(
        &self,
        user_id: &str,
        year: u16,
        month: u8,
    ) -> DbResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(sp.quantity * sp.unit_price), 0.0)
             FROM sale_products sp
             JOIN sales s ON s.id = sp.sale_id
             WHERE s.user_id = ?
               AND CAST(strftime('%Y', s.date_added) AS INTEGER) = ?
               AND CAST(strftime('%m', s.date_added) AS INTEGER) = ?",
        )
        .bind(user_id)
        .bind(year)
        .bind(month)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::model::role::Role;
    use crate::repository::products::NewProduct;
    use crate::repository::users::NewUser;
    use chrono::TimeZone;

    async fn seller(db: &Database) -> String {
        db.users()
            .insert(NewUser {
                username: "seller".to_string(),
                password: "hash".to_string(),
                full_name: "Seller".to_string(),
                role_id: Role::User.id(),
                position_id: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn product(db: &Database, name: &str, price: f64) -> String {
        let category = db.categories().insert("Default".to_string()).await;
        let category_id = match category {
            Ok(c) => c.id,
            // Already created by an earlier call in the same test.
            Err(_) => db.categories().get_by_name("Default").await.unwrap().unwrap().id,
        };

        db.products()
            .insert(NewProduct {
                name: name.to_string(),
                price,
                category_id,
            })
            .await
            .unwrap()
            .id
    }

    #[actix_web::test]
    async fn create_and_fetch_with_lines() {
        let db = Database::in_memory().await.unwrap();
        let user_id = seller(&db).await;
        let product_id = product(&db, "Coffee", 10.0).await;
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();

        let sale = db
            .sales()
            .create(
                &user_id,
                date,
                &[NewSaleLine {
                    product_id: product_id.clone(),
                    quantity: 3,
                    unit_price: 10.0,
                }],
            )
            .await
            .unwrap();

        let fetched = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(fetched.user_id, user_id);

        let by_date = db.sales().get_by_date(date).await.unwrap().unwrap();
        assert_eq!(by_date.id, sale.id);

        let full = db.sales().get_with_lines(&sale.id).await.unwrap().unwrap();
        assert_eq!(full.lines.len(), 1);
        assert_eq!(full.lines[0].quantity, 3);
    }

    #[actix_web::test]
    async fn delete_cascades_lines_but_keeps_products() {
        let db = Database::in_memory().await.unwrap();
        let user_id = seller(&db).await;
        let product_id = product(&db, "Coffee", 10.0).await;

        let sale = db
            .sales()
            .create(
                &user_id,
                Utc::now(),
                &[NewSaleLine {
                    product_id: product_id.clone(),
                    quantity: 1,
                    unit_price: 10.0,
                }],
            )
            .await
            .unwrap();

        db.sales().delete(&sale.id).await.unwrap();

        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
        assert!(db.sales().get_lines(&sale.id).await.unwrap().is_empty());
        assert!(db
            .products()
            .get_by_id(&product_id)
            .await
            .unwrap()
            .is_some());
    }

    #[actix_web::test]
    async fn create_rolls_back_when_a_line_is_invalid() {
        let db = Database::in_memory().await.unwrap();
        let user_id = seller(&db).await;

        let err = db
            .sales()
            .create(
                &user_id,
                Utc::now(),
                &[NewSaleLine {
                    product_id: "missing".to_string(),
                    quantity: 1,
                    unit_price: 10.0,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation(_)));

        assert!(db.sales().get_all().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn monthly_total_sums_only_the_requested_month() {
        let db = Database::in_memory().await.unwrap();
        let user_id = seller(&db).await;
        let coffee = product(&db, "Coffee", 10.0).await;
        let tea = product(&db, "Tea", 4.0).await;

        let march = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let april = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();

        db.sales()
            .create(
                &user_id,
                march,
                &[
                    NewSaleLine {
                        product_id: coffee.clone(),
                        quantity: 2,
                        unit_price: 10.0,
                    },
                    NewSaleLine {
                        product_id: tea.clone(),
                        quantity: 5,
                        unit_price: 4.0,
                    },
                ],
            )
            .await
            .unwrap();
        db.sales()
            .create(
                &user_id,
                april,
                &[NewSaleLine {
                    product_id: coffee,
                    quantity: 1,
                    unit_price: 10.0,
                }],
            )
            .await
            .unwrap();

        let total = db
            .sales()
            .monthly_total_for_user(&user_id, 2026, 3)
            .await
            .unwrap();
        assert_eq!(total, 40.0);

        let empty = db
            .sales()
            .monthly_total_for_user(&user_id, 2026, 5)
            .await
            .unwrap();
        assert_eq!(empty, 0.0);
    }
}
