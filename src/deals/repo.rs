use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    dto::{DealCreate, DealUpdate},
    repo_types::Deal,
};
use crate::error::{is_foreign_key_violation, AppError, AppResult};

pub(crate) const UNKNOWN_INVESTOR: &str = "Investor not found";

#[async_trait]
pub trait DealRepo: Send + Sync {
    async fn create(&self, input: DealCreate) -> AppResult<Deal>;
    async fn list(&self) -> AppResult<Vec<Deal>>;
    async fn list_by_investor(&self, investor_id: i64) -> AppResult<Vec<Deal>>;
    async fn get(&self, id: i64) -> AppResult<Option<Deal>>;
    /// `None` when no deal has this id.
    async fn update(&self, id: i64, changes: DealUpdate) -> AppResult<Option<Deal>>;
    /// `false` when no deal has this id.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

const COLUMNS: &str = "id, property_address, purchase_price, estimated_value, renovation_cost, \
                       status, closing_date, investor_id, notes";

fn map_fk(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        AppError::Validation(UNKNOWN_INVESTOR.into())
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl DealRepo for PgPool {
    async fn create(&self, d: DealCreate) -> AppResult<Deal> {
        let sql = format!(
            r#"
            INSERT INTO deals (property_address, purchase_price, estimated_value,
                               renovation_cost, status, closing_date, investor_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Deal>(&sql)
            .bind(d.property_address)
            .bind(d.purchase_price)
            .bind(d.estimated_value)
            .bind(d.renovation_cost)
            .bind(d.status)
            .bind(d.closing_date)
            .bind(d.investor_id)
            .bind(d.notes)
            .fetch_one(self)
            .await
            .map_err(map_fk)?;
        Ok(row)
    }

    async fn list(&self) -> AppResult<Vec<Deal>> {
        let sql = format!("SELECT {COLUMNS} FROM deals ORDER BY id");
        let rows = sqlx::query_as::<_, Deal>(&sql).fetch_all(self).await?;
        Ok(rows)
    }

    async fn list_by_investor(&self, investor_id: i64) -> AppResult<Vec<Deal>> {
        let sql = format!("SELECT {COLUMNS} FROM deals WHERE investor_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Deal>(&sql)
            .bind(investor_id)
            .fetch_all(self)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> AppResult<Option<Deal>> {
        let sql = format!("SELECT {COLUMNS} FROM deals WHERE id = $1");
        let row = sqlx::query_as::<_, Deal>(&sql)
            .bind(id)
            .fetch_optional(self)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, changes: DealUpdate) -> AppResult<Option<Deal>> {
        let mut tx = self.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM deals WHERE id = $1 FOR UPDATE");
        let Some(mut deal) = sqlx::query_as::<_, Deal>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        changes.apply(&mut deal);

        let update = format!(
            r#"
            UPDATE deals
               SET property_address = $2, purchase_price = $3, estimated_value = $4,
                   renovation_cost = $5, status = $6, closing_date = $7,
                   investor_id = $8, notes = $9
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Deal>(&update)
            .bind(deal.id)
            .bind(deal.property_address)
            .bind(deal.purchase_price)
            .bind(deal.estimated_value)
            .bind(deal.renovation_cost)
            .bind(deal.status)
            .bind(deal.closing_date)
            .bind(deal.investor_id)
            .bind(deal.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_fk)?;

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(self)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
