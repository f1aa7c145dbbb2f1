use async_trait::async_trait;
use sqlx::PgPool;

use super::{dto::PropertyCreate, repo_types::Property};
use crate::error::AppResult;

#[async_trait]
pub trait PropertyRepo: Send + Sync {
    async fn create(&self, input: PropertyCreate) -> AppResult<Property>;
    async fn list(&self) -> AppResult<Vec<Property>>;
    async fn get(&self, id: i64) -> AppResult<Option<Property>>;
}

const COLUMNS: &str = "id, address, city, state, zip_code, purchase_price, estimated_value, \
                       renovation_cost, status, acquisition_date, sale_date, notes";

#[async_trait]
impl PropertyRepo for PgPool {
    async fn create(&self, p: PropertyCreate) -> AppResult<Property> {
        let sql = format!(
            r#"
            INSERT INTO properties (address, city, state, zip_code, purchase_price,
                                    estimated_value, renovation_cost, status,
                                    acquisition_date, sale_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Property>(&sql)
            .bind(p.address)
            .bind(p.city)
            .bind(p.state)
            .bind(p.zip_code)
            .bind(p.purchase_price)
            .bind(p.estimated_value)
            .bind(p.renovation_cost)
            .bind(p.status)
            .bind(p.acquisition_date)
            .bind(p.sale_date)
            .bind(p.notes)
            .fetch_one(self)
            .await?;
        Ok(row)
    }

    async fn list(&self) -> AppResult<Vec<Property>> {
        let sql = format!("SELECT {COLUMNS} FROM properties ORDER BY id");
        let rows = sqlx::query_as::<_, Property>(&sql).fetch_all(self).await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> AppResult<Option<Property>> {
        let sql = format!("SELECT {COLUMNS} FROM properties WHERE id = $1");
        let row = sqlx::query_as::<_, Property>(&sql)
            .bind(id)
            .fetch_optional(self)
            .await?;
        Ok(row)
    }
}
