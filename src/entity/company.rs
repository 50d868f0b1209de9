//! Company entity: one onboarding in progress.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub customer_name: String,
    pub customer_first_name: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(unique)]
    pub clickup_task_id: String,
    pub company_name: String,
    pub typeform_submission_id: Option<String>,
    pub kyb_status: String,
    pub kyb_failure_reason: Option<String>,
    pub first_upload_at: Option<DateTimeUtc>,
    pub kyb_completed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::upload_token::Entity")]
    UploadTokens,
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
}

impl Related<super::upload_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UploadTokens.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
