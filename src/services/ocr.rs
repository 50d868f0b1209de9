//! OCR dispatch and result handling.
//!
//! The upload handler must not block for the minutes Textract can take, so
//! dispatch spawns a background task: start the analysis job, then poll on a
//! fixed interval up to a configured bound. Exhausting the bound marks the
//! document failed; nothing retries automatically. A caller-driven check
//! endpoint reuses the same outcome application, which is idempotent against
//! re-delivered results.

use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::document;
use crate::error::{AppError, AppResult};
use crate::models::{ExtractedFields, KybStatus, OcrStatus};
use crate::services::clickup::ClickUpClient;
use crate::services::storage::Storage;
use crate::services::textract::{JobOutcome, TextractClient};

/// Coordinates Textract jobs for uploaded documents.
#[derive(Clone)]
pub struct OcrDispatcher {
    db: DbPool,
    storage: Storage,
    textract: TextractClient,
    clickup: ClickUpClient,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl OcrDispatcher {
    pub fn new(
        db: DbPool,
        storage: Storage,
        textract: TextractClient,
        clickup: ClickUpClient,
        poll_interval_secs: u64,
        max_poll_attempts: u32,
    ) -> Self {
        Self {
            db,
            storage,
            textract,
            clickup,
            poll_interval: Duration::from_secs(poll_interval_secs),
            max_poll_attempts,
        }
    }

    /// Start processing a freshly uploaded document in the background.
    ///
    /// The spawned task owns the full lifecycle; the upload response does not
    /// wait for any of it.
    pub fn dispatch(&self, doc: document::Model) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            let doc_id = doc.id;
            if let Err(e) = dispatcher.process_document(doc).await {
                error!("OCR processing for document {} failed: {}", doc_id, e);
                if let Err(db_err) = dispatcher.record_failure(doc_id, &e.to_string()).await {
                    error!("Failed to record OCR failure for {}: {}", doc_id, db_err);
                }
            }
        });
    }

    /// Full background lifecycle: start job, poll to completion or bound.
    async fn process_document(&self, doc: document::Model) -> AppResult<()> {
        let job_id = self
            .textract
            .start_analysis(self.storage.bucket(), &doc.s3_key)
            .await?;

        self.db.mark_document_processing(doc.id, &job_id).await?;
        self.db
            .advance_company_status(doc.company_id, KybStatus::Processing, None)
            .await?;

        let mut attempt = 0u32;
        loop {
            tokio::time::sleep(self.poll_interval).await;
            attempt += 1;

            let outcome = self.textract.check_job(&job_id).await;
            match next_poll_step(
                outcome,
                attempt,
                self.max_poll_attempts,
                self.poll_interval.as_secs(),
            ) {
                PollStep::Continue => {
                    info!(
                        "Textract job {} not finished (attempt {}/{})",
                        job_id, attempt, self.max_poll_attempts
                    );
                }
                PollStep::Complete(fields) => {
                    self.record_completion(doc.id, &fields).await?;
                    return Ok(());
                }
                PollStep::Fail(reason) => {
                    self.record_failure(doc.id, &reason).await?;
                    return Ok(());
                }
            }
        }
    }

    /// Run one completion check for a document with a recorded job.
    ///
    /// Used by the caller-driven check endpoint. Terminal documents are
    /// returned unchanged; re-delivery of an already-applied result is a
    /// no-op all the way down.
    pub async fn check_once(&self, doc: &document::Model) -> AppResult<document::Model> {
        let status = OcrStatus::parse(&doc.ocr_status)
            .ok_or_else(|| AppError::Database(format!("Unknown ocr_status '{}'", doc.ocr_status)))?;

        if status.is_terminal() {
            return Ok(doc.clone());
        }

        let Some(ref job_id) = doc.textract_job_id else {
            // Pending with no job recorded: (re)dispatch rather than check
            self.dispatch(doc.clone());
            return Ok(doc.clone());
        };

        match self.textract.check_job(job_id).await? {
            JobOutcome::InProgress => Ok(doc.clone()),
            JobOutcome::Completed(fields) => self.record_completion(doc.id, &fields).await,
            JobOutcome::Failed(reason) => self.record_failure(doc.id, &reason).await,
        }
    }

    /// Persist a successful extraction and advance the company.
    async fn record_completion(
        &self,
        doc_id: Uuid,
        fields: &ExtractedFields,
    ) -> AppResult<document::Model> {
        let doc = self.db.complete_document_ocr(doc_id, fields).await?;
        let company = self
            .db
            .advance_company_status(doc.company_id, KybStatus::Completed, None)
            .await?;

        if fields.is_empty() {
            warn!(
                "OCR completed for document {} but recognized no fields; manual review needed",
                doc_id
            );
        }

        info!(
            "OCR completed for document {} (company {}, extracted company_name={:?})",
            doc_id, doc.company_id, fields.company_name
        );

        // Task-system notification is best-effort
        if let Err(e) = self
            .clickup
            .post_kyb_status(
                &company.clickup_task_id,
                KybStatus::Completed,
                Some(&company.email),
            )
            .await
        {
            warn!("ClickUp KYB completion notification failed: {}", e);
        }

        Ok(doc)
    }

    /// Persist a terminal failure and advance the company.
    async fn record_failure(&self, doc_id: Uuid, reason: &str) -> AppResult<document::Model> {
        let doc = self.db.fail_document_ocr(doc_id, reason).await?;
        let company = self
            .db
            .advance_company_status(doc.company_id, KybStatus::Failed, Some(reason))
            .await?;

        warn!(
            "OCR failed for document {} (company {}): {}",
            doc_id, doc.company_id, reason
        );

        if let Err(e) = self
            .clickup
            .post_kyb_status(
                &company.clickup_task_id,
                KybStatus::Failed,
                Some(&company.email),
            )
            .await
        {
            warn!("ClickUp KYB failure notification failed: {}", e);
        }

        Ok(doc)
    }
}

/// What the poll loop does next with one check result.
#[derive(Debug, PartialEq)]
enum PollStep {
    Continue,
    Complete(ExtractedFields),
    Fail(String),
}

/// Map one completion check onto the next loop action.
///
/// A transport error is treated like an in-progress job while attempts
/// remain: the Textract job itself may still be running, so the poll budget
/// decides, not the first flaky response. Exhausting the budget is terminal
/// either way.
fn next_poll_step(
    outcome: AppResult<JobOutcome>,
    attempt: u32,
    max_attempts: u32,
    interval_secs: u64,
) -> PollStep {
    match outcome {
        Ok(JobOutcome::Completed(fields)) => PollStep::Complete(fields),
        Ok(JobOutcome::Failed(reason)) => PollStep::Fail(reason),
        Ok(JobOutcome::InProgress) => {
            if attempt >= max_attempts {
                PollStep::Fail(format!(
                    "Textract job timed out after {} seconds",
                    max_attempts as u64 * interval_secs
                ))
            } else {
                PollStep::Continue
            }
        }
        Err(e) => {
            if attempt >= max_attempts {
                PollStep::Fail(format!("Textract job checks kept failing: {}", e))
            } else {
                warn!(
                    "Textract check failed (attempt {}/{}), will retry: {}",
                    attempt, max_attempts, e
                );
                PollStep::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_job_finishes_immediately() {
        let fields = ExtractedFields {
            company_name: Some("AutoTest Solutions Bhd".to_string()),
            ..Default::default()
        };
        let step = next_poll_step(Ok(JobOutcome::Completed(fields.clone())), 1, 30, 10);
        assert_eq!(step, PollStep::Complete(fields));
    }

    #[test]
    fn test_provider_failure_is_terminal() {
        let step = next_poll_step(Ok(JobOutcome::Failed("bad input".to_string())), 1, 30, 10);
        assert_eq!(step, PollStep::Fail("bad input".to_string()));
    }

    #[test]
    fn test_in_progress_times_out_at_budget() {
        assert_eq!(
            next_poll_step(Ok(JobOutcome::InProgress), 29, 30, 10),
            PollStep::Continue
        );
        assert_eq!(
            next_poll_step(Ok(JobOutcome::InProgress), 30, 30, 10),
            PollStep::Fail("Textract job timed out after 300 seconds".to_string())
        );
    }

    #[test]
    fn test_transient_check_error_retries_within_budget() {
        let err = AppError::Extraction("connection reset".to_string());
        assert_eq!(next_poll_step(Err(err), 1, 30, 10), PollStep::Continue);

        let err = AppError::Extraction("connection reset".to_string());
        let step = next_poll_step(Err(err), 30, 30, 10);
        assert!(matches!(step, PollStep::Fail(reason) if reason.contains("connection reset")));
    }
}
