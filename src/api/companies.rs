//! Company lookup endpoints for operational visibility.

use actix_web::{HttpResponse, get, web};

use crate::db::DbPool;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::CompanyRecord;

/// Fetch a company record by its external ClickUp task id.
#[utoipa::path(
    get,
    path = "/api/v1/companies/{task_id}",
    tag = "Companies",
    params(("task_id" = String, Path, description = "ClickUp task id")),
    responses(
        (status = 200, description = "Company record", body = CompanyRecord),
        (status = 404, description = "No company for this task id", body = ErrorResponse)
    )
)]
#[get("/companies/{task_id}")]
pub async fn get_company(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let task_id = path.into_inner();

    let company = pool
        .get_company_by_task_id(&task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company for task {}", task_id)))?;

    Ok(HttpResponse::Ok().json(CompanyRecord::from(company)))
}

/// Configure company routes.
pub fn configure_company_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_company);
}
