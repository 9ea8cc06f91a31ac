use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Versioned terms and policies share one table, split by `kind`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "legal_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: String,
    pub doc_type: String,
    pub version: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub effective_date: Date,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalKind {
    Terms,
    Policy,
}

impl LegalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LegalKind::Terms => "terms",
            LegalKind::Policy => "policy",
        }
    }

    pub fn doc_types(self) -> &'static [&'static str] {
        match self {
            LegalKind::Terms => &["general", "event", "payment", "privacy-notice"],
            LegalKind::Policy => &["privacy", "cookies", "refund", "data-retention"],
        }
    }
}
