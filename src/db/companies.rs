//! Database queries for company records.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::company::{self, ActiveModel, Column, Entity as Company};
use crate::error::{AppError, AppResult};
use crate::models::{KybStatus, ValidatedSignup};

use super::DbPool;

impl DbPool {
    /// Insert a new company record with the initial KYB status.
    pub async fn insert_company(&self, signup: &ValidatedSignup) -> AppResult<company::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(signup.customer_email.clone()),
            customer_name: Set(signup.customer_name.clone()),
            customer_first_name: Set(signup.customer_first_name.clone()),
            phone: Set(signup.phone.clone()),
            clickup_task_id: Set(signup.clickup_task_id.clone()),
            company_name: Set(signup.company_name.clone()),
            typeform_submission_id: Set(signup.typeform_response_id.clone()),
            kyb_status: Set(KybStatus::INITIAL.as_str().to_string()),
            kyb_failure_reason: Set(None),
            first_upload_at: Set(None),
            kyb_completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert company: {}", e)))?;

        Ok(result)
    }

    /// Get a company by its internal id.
    pub async fn get_company_by_id(&self, id: Uuid) -> AppResult<Option<company::Model>> {
        let result = Company::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get company: {}", e)))?;

        Ok(result)
    }

    /// Get a company by its external ClickUp task id.
    pub async fn get_company_by_task_id(
        &self,
        task_id: &str,
    ) -> AppResult<Option<company::Model>> {
        let result = Company::find()
            .filter(Column::ClickupTaskId.eq(task_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get company: {}", e)))?;

        Ok(result)
    }

    /// Advance a company's KYB status, enforcing the monotonic progression.
    ///
    /// A transition that does not move forward (including any transition out
    /// of a terminal state) is silently dropped and the current row is
    /// returned unchanged. This is what makes re-delivered OCR completions
    /// idempotent at the company level.
    pub async fn advance_company_status(
        &self,
        id: Uuid,
        next: KybStatus,
        failure_reason: Option<&str>,
    ) -> AppResult<company::Model> {
        let row = self
            .get_company_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {}", id)))?;

        let current = KybStatus::parse(&row.kyb_status)
            .ok_or_else(|| AppError::Database(format!("Unknown kyb_status '{}'", row.kyb_status)))?;

        if !current.can_advance_to(next) {
            tracing::debug!(
                "Skipping kyb_status transition {} -> {} for company {} (not forward)",
                current,
                next,
                id
            );
            return Ok(row);
        }

        let mut active: ActiveModel = row.into();
        active.kyb_status = Set(next.as_str().to_string());
        active.updated_at = Set(Utc::now());
        match next {
            KybStatus::Completed => {
                active.kyb_completed_at = Set(Some(Utc::now()));
            }
            KybStatus::Failed => {
                active.kyb_failure_reason = Set(failure_reason.map(str::to_string));
            }
            _ => {}
        }

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update company status: {}", e)))?;

        Ok(result)
    }

    /// Stamp the first-upload timestamp if not already set.
    pub async fn mark_first_upload(&self, id: Uuid) -> AppResult<()> {
        let row = self
            .get_company_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Company {}", id)))?;

        if row.first_upload_at.is_some() {
            return Ok(());
        }

        let mut active: ActiveModel = row.into();
        active.first_upload_at = Set(Some(Utc::now()));
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to stamp first upload: {}", e)))?;

        Ok(())
    }
}
