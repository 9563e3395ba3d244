use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("slug `{slug}` is already taken")]
    Slug { slug: String },

    #[error("destination is already shortened as `{existing_slug}`")]
    Destination { existing_slug: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(#[from] Conflict),

    #[error("slug `{slug}` not found")]
    NotFound { slug: String },

    #[error("url id {url_id} does not exist")]
    ReferentialIntegrity { url_id: i32 },

    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("no free slug after {attempts} attempts")]
    SlugExhausted { attempts: usize },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    pub fn not_found(slug: impl Into<String>) -> Self {
        StoreError::NotFound { slug: slug.into() }
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
