//! Document entity: one uploaded file tied to a company.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub upload_token: String,
    pub s3_key: String,
    pub filename: String,
    pub file_size: i64,
    pub uploaded_at: DateTimeUtc,
    pub ocr_status: String,
    pub textract_job_id: Option<String>,
    pub ocr_started_at: Option<DateTimeUtc>,
    pub ocr_completed_at: Option<DateTimeUtc>,
    pub ocr_failure_reason: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub extracted_fields: Option<JsonValue>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
