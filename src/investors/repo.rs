use async_trait::async_trait;
use sqlx::PgPool;

use super::{dto::InvestorCreate, repo_types::Investor};
use crate::error::{is_unique_violation, AppError, AppResult};

pub(crate) const DUPLICATE_EMAIL: &str = "Investor email already registered";

#[async_trait]
pub trait InvestorRepo: Send + Sync {
    /// Fails with a validation error when the email is already taken.
    async fn create(&self, input: InvestorCreate) -> AppResult<Investor>;
    async fn list(&self) -> AppResult<Vec<Investor>>;
    async fn get(&self, id: i64) -> AppResult<Option<Investor>>;
}

#[async_trait]
impl InvestorRepo for PgPool {
    async fn create(&self, input: InvestorCreate) -> AppResult<Investor> {
        let row = sqlx::query_as::<_, Investor>(
            r#"
            INSERT INTO investors (name, email, phone, total_investment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, total_investment
            "#,
        )
        .bind(input.name)
        .bind(input.email)
        .bind(input.phone)
        .bind(input.total_investment)
        .fetch_one(self)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Validation(DUPLICATE_EMAIL.into())
            } else {
                AppError::Database(e)
            }
        })?;
        Ok(row)
    }

    async fn list(&self) -> AppResult<Vec<Investor>> {
        let rows = sqlx::query_as::<_, Investor>(
            "SELECT id, name, email, phone, total_investment FROM investors ORDER BY id",
        )
        .fetch_all(self)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> AppResult<Option<Investor>> {
        let row = sqlx::query_as::<_, Investor>(
            "SELECT id, name, email, phone, total_investment FROM investors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(row)
    }
}
