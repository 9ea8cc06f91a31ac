//! Versioned terms of service and policies.
//!
//! Both kinds live in `legal_documents`. Per (kind, doc_type) at most one
//! version is active; switching it runs in a transaction.

use crate::{
    error::{AppError, AppResult},
    models::{legal_document, LegalDocument, LegalDocumentModel, LegalKind, SoftDelete},
    validation::{is_version, validate, FieldRule, Rule},
};
use chrono::NaiveDate;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

const LEGAL_RULES: &[FieldRule] = &[
    FieldRule {
        field: "version",
        rules: &[
            Rule::Required,
            Rule::Length { min: 1, max: 20 },
            Rule::Pattern {
                check: is_version,
                expected: "a dotted version such as 1.0",
            },
        ],
    },
    FieldRule {
        field: "title",
        rules: &[Rule::Required, Rule::Length { min: 1, max: 200 }],
    },
    FieldRule {
        field: "content",
        rules: &[Rule::Required],
    },
];

#[derive(Debug, Clone)]
pub struct LegalInput {
    pub doc_type: String,
    pub version: String,
    pub title: String,
    pub content: String,
    pub effective_date: NaiveDate,
    pub is_active: bool,
}

impl LegalInput {
    fn validate(&self, kind: LegalKind) -> AppResult<()> {
        ensure_doc_type(kind, &self.doc_type)?;
        validate(
            LEGAL_RULES,
            &[
                ("version", Some(self.version.as_str())),
                ("title", Some(self.title.as_str())),
                ("content", Some(self.content.as_str())),
            ],
        )
    }
}

pub fn ensure_doc_type(kind: LegalKind, doc_type: &str) -> AppResult<()> {
    if kind.doc_types().iter().any(|t| *t == doc_type) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{} type must be one of: {}",
            kind.as_str(),
            kind.doc_types().join(", ")
        )))
    }
}

pub struct LegalService {
    db: DatabaseConnection,
    kind: LegalKind,
}

impl LegalService {
    pub fn new(db: DatabaseConnection, kind: LegalKind) -> Self {
        Self { db, kind }
    }

    /// All live versions, optionally narrowed to one type, newest first.
    pub async fn list(&self, doc_type: Option<&str>) -> AppResult<Vec<LegalDocumentModel>> {
        let mut query = LegalDocument::find_active()
            .filter(legal_document::Column::Kind.eq(self.kind.as_str()));
        if let Some(doc_type) = doc_type {
            ensure_doc_type(self.kind, doc_type)?;
            query = query.filter(legal_document::Column::DocType.eq(doc_type));
        }

        let docs = query
            .order_by_asc(legal_document::Column::DocType)
            .order_by_desc(legal_document::Column::EffectiveDate)
            .order_by_desc(legal_document::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(docs)
    }

    pub async fn get_active(&self, doc_type: &str) -> AppResult<LegalDocumentModel> {
        ensure_doc_type(self.kind, doc_type)?;
        LegalDocument::find_active()
            .filter(legal_document::Column::Kind.eq(self.kind.as_str()))
            .filter(legal_document::Column::DocType.eq(doc_type))
            .filter(legal_document::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<LegalDocumentModel> {
        LegalDocument::find_active_by_id(id)
            .filter(legal_document::Column::Kind.eq(self.kind.as_str()))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, input: LegalInput, created_by: i32) -> AppResult<LegalDocumentModel> {
        input.validate(self.kind)?;

        // Retired versions keep their number.
        let taken = LegalDocument::find()
            .filter(legal_document::Column::Kind.eq(self.kind.as_str()))
            .filter(legal_document::Column::DocType.eq(input.doc_type.as_str()))
            .filter(legal_document::Column::Version.eq(input.version.as_str()))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(AppError::Conflict(format!(
                "Version {} of {} '{}' already exists",
                input.version,
                self.kind.as_str(),
                input.doc_type
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let txn = self.db.begin().await?;

        let doc = legal_document::ActiveModel {
            kind: Set(self.kind.as_str().to_string()),
            doc_type: Set(input.doc_type),
            version: Set(input.version),
            title: Set(input.title),
            content: Set(input.content),
            effective_date: Set(input.effective_date),
            is_active: Set(input.is_active),
            created_by: Set(Some(created_by)),
            updated_by: Set(Some(created_by)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if doc.is_active {
            deactivate_siblings(&txn, &doc).await?;
        }
        txn.commit().await?;

        tracing::info!(
            document_id = doc.id,
            kind = self.kind.as_str(),
            doc_type = %doc.doc_type,
            version = %doc.version,
            "Legal document created"
        );
        Ok(doc)
    }

    /// Make `id` the active version of its type, deactivating the others.
    pub async fn activate(&self, id: i32, updated_by: i32) -> AppResult<LegalDocumentModel> {
        let txn = self.db.begin().await?;

        let doc = LegalDocument::find_active_by_id(id)
            .filter(legal_document::Column::Kind.eq(self.kind.as_str()))
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        deactivate_siblings(&txn, &doc).await?;

        let mut active: legal_document::ActiveModel = doc.into();
        active.is_active = Set(true);
        active.updated_by = Set(Some(updated_by));
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        let activated = active.update(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            document_id = id,
            kind = self.kind.as_str(),
            doc_type = %activated.doc_type,
            version = %activated.version,
            "Legal document activated"
        );
        Ok(activated)
    }

    pub async fn delete(&self, id: i32, deleted_by: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: legal_document::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.deleted_at = Set(Some(now));
        active.updated_by = Set(Some(deleted_by));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        tracing::info!(document_id = id, kind = self.kind.as_str(), "Legal document soft-deleted");
        Ok(())
    }
}

async fn deactivate_siblings<C: ConnectionTrait>(
    conn: &C,
    doc: &LegalDocumentModel,
) -> AppResult<()> {
    LegalDocument::update_many()
        .col_expr(legal_document::Column::IsActive, Expr::value(false))
        .col_expr(
            legal_document::Column::UpdatedAt,
            Expr::value(chrono::Utc::now().naive_utc()),
        )
        .filter(legal_document::Column::Kind.eq(doc.kind.as_str()))
        .filter(legal_document::Column::DocType.eq(doc.doc_type.as_str()))
        .filter(legal_document::Column::Id.ne(doc.id))
        .filter(legal_document::Column::IsActive.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(doc_type: &str, version: &str) -> LegalInput {
        LegalInput {
            doc_type: doc_type.to_string(),
            version: version.to_string(),
            title: "Terms".to_string(),
            content: "Content".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            is_active: false,
        }
    }

    #[test]
    fn doc_types_depend_on_kind() {
        assert!(ensure_doc_type(LegalKind::Terms, "payment").is_ok());
        assert!(ensure_doc_type(LegalKind::Policy, "payment").is_err());
        assert!(ensure_doc_type(LegalKind::Policy, "cookies").is_ok());
    }

    #[test]
    fn version_format_enforced() {
        assert!(input("general", "1.0").validate(LegalKind::Terms).is_ok());
        assert!(input("general", "2.10.1").validate(LegalKind::Terms).is_ok());
        assert!(input("general", "v2").validate(LegalKind::Terms).is_err());
        assert!(input("general", "1.").validate(LegalKind::Terms).is_err());
    }

    #[test]
    fn unknown_type_message_lists_choices() {
        let err = input("cookies", "1.0")
            .validate(LegalKind::Terms)
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("general, event, payment, privacy-notice"));
    }
}
