use chrono::{DateTime, Utc};
use entity::{access_log, url};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use shared::DbPool;
use tracing::{debug, info, instrument, warn};

use crate::error::{Conflict, Result, StoreError, is_foreign_key_violation, is_unique_violation};
use crate::normalize::normalize_url;
use crate::slug::{SLUG_LENGTH, generate_slug, validate_slug};

/// Generated slugs tried before giving up.
pub const MAX_SLUG_ATTEMPTS: usize = 8;

#[derive(Clone, Debug, Default)]
pub struct NewMapping {
    pub url: String,
    pub slug: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewMapping {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UrlStats {
    #[serde(flatten)]
    pub url: url::Model,
    pub accessed_at: Vec<DateTime<Utc>>,
}

#[derive(Clone, Debug)]
pub struct UrlStore {
    db: DbPool,
    slug_source: fn(usize) -> String,
}

impl UrlStore {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            slug_source: generate_slug,
        }
    }

    /// Replaces the generator used when a mapping has no caller-chosen slug.
    pub fn with_slug_source(mut self, slug_source: fn(usize) -> String) -> Self {
        self.slug_source = slug_source;
        self
    }

    /// Inserts a new mapping.
    ///
    /// Fails with [`Conflict::Destination`] when the normalised url is already
    /// mapped, and with [`Conflict::Slug`] when a caller-chosen slug is taken.
    /// Generated slugs that collide are redrawn up to [`MAX_SLUG_ATTEMPTS`] times.
    #[instrument(name = "Store: Create mapping", skip(self, new), fields(url = %new.url))]
    pub async fn create_mapping(&self, new: NewMapping) -> Result<url::Model> {
        let normalized = normalize_url(&new.url)?;
        if let Some(slug) = &new.slug {
            validate_slug(slug)?;
        }

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            self.ensure_destination_free(&normalized).await?;

            let slug = match &new.slug {
                Some(slug) => slug.clone(),
                None => (self.slug_source)(SLUG_LENGTH),
            };

            let row = url::ActiveModel {
                id: NotSet,
                slug: Set(slug.clone()),
                normalized_url: Set(normalized.clone()),
                created_at: Set(Utc::now()),
                expires_at: Set(new.expires_at),
            };

            match row.insert(&*self.db).await {
                Ok(model) => {
                    info!(id = model.id, slug = %model.slug, "Created mapping");
                    return Ok(model);
                }
                Err(e) if is_unique_violation(&e) => {
                    // a concurrent insert may have taken the destination
                    self.ensure_destination_free(&normalized).await?;
                    if new.slug.is_some() {
                        return Err(Conflict::Slug { slug }.into());
                    }
                    warn!(%slug, attempt, "Generated slug collided, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::SlugExhausted {
            attempts: MAX_SLUG_ATTEMPTS,
        })
    }

    /// Returns the existing mapping for the destination, or creates one.
    /// The flag is `true` when a row was inserted.
    pub async fn shorten(&self, new: NewMapping) -> Result<(url::Model, bool)> {
        match self.create_mapping(new).await {
            Ok(model) => Ok((model, true)),
            Err(StoreError::Conflict(Conflict::Destination { existing_slug })) => {
                let existing = self
                    .find_by_slug(&existing_slug)
                    .await?
                    .ok_or_else(|| StoreError::not_found(existing_slug.clone()))?;
                debug!(slug = %existing.slug, "Destination already shortened");
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Looks a slug up, treating expired mappings as absent.
    #[instrument(name = "Store: Resolve slug", skip(self))]
    pub async fn resolve(&self, slug: &str) -> Result<url::Model> {
        self.resolve_at(slug, Utc::now()).await
    }

    pub async fn resolve_at(&self, slug: &str, now: DateTime<Utc>) -> Result<url::Model> {
        let model = self
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::not_found(slug))?;

        if model.is_expired_at(now) {
            debug!(%slug, expires_at = ?model.expires_at, "Mapping expired");
            return Err(StoreError::not_found(slug));
        }

        Ok(model)
    }

    pub async fn record_access(&self, url_id: i32) -> Result<access_log::Model> {
        let row = access_log::ActiveModel {
            id: NotSet,
            url_id: Set(url_id),
            accessed_at: Set(Utc::now()),
        };

        row.insert(&*self.db).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::ReferentialIntegrity { url_id }
            } else {
                e.into()
            }
        })
    }

    /// Resolves a slug and logs the access.
    #[instrument(name = "Store: Visit", skip(self))]
    pub async fn visit(&self, slug: &str) -> Result<url::Model> {
        let model = self.resolve(slug).await?;
        self.record_access(model.id).await?;
        info!(%slug, "Recorded access");
        Ok(model)
    }

    /// Deletes a mapping; its access logs go with it.
    #[instrument(name = "Store: Delete mapping", skip(self))]
    pub async fn delete_mapping(&self, slug: &str) -> Result<url::Model> {
        let model = self
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::not_found(slug))?;

        let result = model.clone().delete(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found(slug));
        }

        info!(%slug, id = model.id, "Deleted mapping");
        Ok(model)
    }

    /// Mapping plus access times, oldest first. Expired mappings are included.
    pub async fn stats(&self, slug: &str) -> Result<UrlStats> {
        let url = self
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::not_found(slug))?;

        let accessed_at = access_log::Entity::find()
            .select_only()
            .column(access_log::Column::AccessedAt)
            .filter(access_log::Column::UrlId.eq(url.id))
            .order_by_asc(access_log::Column::AccessedAt)
            .order_by_asc(access_log::Column::Id)
            .into_tuple::<DateTime<Utc>>()
            .all(&*self.db)
            .await?;

        Ok(UrlStats { url, accessed_at })
    }

    pub async fn list_mappings(&self) -> Result<Vec<url::Model>> {
        Ok(url::Entity::find()
            .order_by_asc(url::Column::Id)
            .all(&*self.db)
            .await?)
    }

    /// Deletes every mapping whose deadline lies before `now`.
    #[instrument(name = "Store: Purge expired", skip(self))]
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = url::Entity::delete_many()
            .filter(url::Column::ExpiresAt.is_not_null())
            .filter(url::Column::ExpiresAt.lt(now))
            .exec(&*self.db)
            .await?;

        info!(rows = result.rows_affected, "Purged expired mappings");
        Ok(result.rows_affected)
    }

    pub async fn ping(&self) -> Result<()> {
        Ok(self.db.ping().await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<url::Model>> {
        Ok(url::Entity::find()
            .filter(url::Column::Slug.eq(slug))
            .one(&*self.db)
            .await?)
    }

    async fn ensure_destination_free(&self, normalized: &str) -> Result<()> {
        let existing = url::Entity::find()
            .filter(url::Column::NormalizedUrl.eq(normalized))
            .one(&*self.db)
            .await?;

        match existing {
            Some(existing) => Err(Conflict::Destination {
                existing_slug: existing.slug,
            }
            .into()),
            None => Ok(()),
        }
    }
}
