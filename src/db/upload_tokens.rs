//! Database queries for upload tokens.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::entity::upload_token::{self, ActiveModel, Entity as UploadToken};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Insert a freshly generated upload token for a company.
    pub async fn insert_upload_token(
        &self,
        token: &str,
        company_id: Uuid,
        ttl_hours: i64,
    ) -> AppResult<upload_token::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            token: Set(token.to_string()),
            company_id: Set(company_id),
            expires_at: Set(now + chrono::Duration::hours(ttl_hours)),
            created_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert upload token: {}", e)))?;

        Ok(result)
    }

    /// Look up a token and check its expiry.
    ///
    /// Returns `InvalidToken` both for an unknown token and an expired one;
    /// callers must not learn which.
    pub async fn find_valid_token(&self, token: &str) -> AppResult<upload_token::Model> {
        let row = UploadToken::find_by_id(token.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up token: {}", e)))?
            .ok_or(AppError::InvalidToken)?;

        if row.expires_at < Utc::now() {
            return Err(AppError::InvalidToken);
        }

        Ok(row)
    }
}
