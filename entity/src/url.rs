use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Longest slug the `urls.slug` column accepts.
pub const SLUG_MAX_LEN: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "urls")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text", unique)]
    pub normalized_url: String,
    pub created_at: DateTimeUtc,
    pub expires_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::access_log::Entity")]
    AccessLog,
}

impl Related<super::access_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A mapping is expired once `expires_at` lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTimeUtc) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn model(expires_at: Option<DateTimeUtc>) -> Model {
        Model {
            id: 1,
            slug: "abc123".to_string(),
            normalized_url: "https://example.com/page".to_string(),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_never_expires_without_deadline() {
        assert!(!model(None).is_expired_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_future_deadline_not_expired() {
        let now = Utc::now();
        assert!(!model(Some(now + Duration::hours(1))).is_expired_at(now));
    }

    #[test]
    fn test_past_deadline_expired() {
        let now = Utc::now();
        assert!(model(Some(now - Duration::seconds(1))).is_expired_at(now));
    }

    #[test]
    fn test_deadline_equal_to_now_still_valid() {
        let now = Utc::now();
        assert!(!model(Some(now)).is_expired_at(now));
    }
}
