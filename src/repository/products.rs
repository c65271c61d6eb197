use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::model::product::Product;

pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category_id: String,
}

/// Optional list filters; both conditions are ANDed when present.
#[derive(Debug, Default)]
pub struct ProductFilter {
    pub category_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProductsRepository {
    pool: SqlitePool,
}

impl ProductsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductsRepository { pool }
    }

    fn where_clause(filter: &ProductFilter) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut bindings = Vec::new();

        if let Some(category_id) = &filter.category_id {
            conditions.push("category_id = ?");
            bindings.push(category_id.clone());
        }

        if let Some(search) = &filter.search {
            conditions.push("name LIKE ?");
            bindings.push(format!("%{}%", search));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (clause, bindings)
    }

    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, category_id FROM products ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Product>> {
        let (clause, bindings) = Self::where_clause(filter);

        let sql = format!(
            "SELECT id, name, price, category_id FROM products {} ORDER BY name LIMIT ? OFFSET ?",
            clause
        );
        debug!(sql = %sql, "Listing products");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for b in &bindings {
            query = query.bind(b);
        }

        let products = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(products)
    }

    pub async fn count(&self, filter: &ProductFilter) -> DbResult<i64> {
        let (clause, bindings) = Self::where_clause(filter);

        let sql = format!("SELECT COUNT(*) FROM products {}", clause);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for b in &bindings {
            query = query.bind(b);
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, category_id FROM products WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, category_id FROM products WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn insert(&self, new: NewProduct) -> DbResult<Product> {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            price: new.price,
            category_id: new.category_id,
        };

        debug!(name = %product.name, "Inserting product");

        sqlx::query("INSERT INTO products (id, name, price, category_id) VALUES (?, ?, ?, ?)")
            .bind(&product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.category_id)
            .execute(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE products SET name = ?, price = ?, category_id = ? WHERE id = ?")
                .bind(&product.name)
                .bind(product.price)
                .bind(&product.category_id)
                .bind(&product.id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn category(db: &Database, name: &str) -> String {
        db.categories().insert(name.to_string()).await.unwrap().id
    }

    #[actix_web::test]
    async fn crud_roundtrip() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let category_id = category(&db, "Beverages").await;

        let inserted = repo
            .insert(NewProduct {
                name: "Coffee beans 1kg".to_string(),
                price: 18.5,
                category_id,
            })
            .await
            .unwrap();

        let mut fetched = repo.get_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Coffee beans 1kg");
        assert_eq!(
            repo.get_by_name("Coffee beans 1kg")
                .await
                .unwrap()
                .unwrap()
                .id,
            inserted.id
        );

        let before = repo.get_all().await.unwrap().len();
        fetched.price = 19.0;
        repo.update(&fetched).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), before);

        repo.delete(&fetched.id).await.unwrap();
        assert!(repo.get_by_id(&fetched.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn insert_requires_existing_category() {
        let db = Database::in_memory().await.unwrap();

        let err = db
            .products()
            .insert(NewProduct {
                name: "Orphan".to_string(),
                price: 1.0,
                category_id: "missing".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation(_)));
    }

    #[actix_web::test]
    async fn list_filters_by_category_and_search() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.products();
        let drinks = category(&db, "Beverages").await;
        let snacks = category(&db, "Snacks").await;

        for (name, cat) in [
            ("Coffee beans 1kg", &drinks),
            ("Green tea", &drinks),
            ("Coffee biscuits", &snacks),
        ] {
            repo.insert(NewProduct {
                name: name.to_string(),
                price: 5.0,
                category_id: cat.clone(),
            })
            .await
            .unwrap();
        }

        let filter = ProductFilter {
            category_id: Some(drinks.clone()),
            search: Some("Coffee".to_string()),
        };
        let found = repo.list(&filter, 20, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Coffee beans 1kg");
        assert_eq!(repo.count(&filter).await.unwrap(), 1);

        let all = repo.count(&ProductFilter::default()).await.unwrap();
        assert_eq!(all, 3);
    }
}
