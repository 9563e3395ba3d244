pub mod error;
pub mod normalize;
pub mod slug;
pub mod store;

pub use error::{Conflict, StoreError};
pub use normalize::normalize_url;
pub use slug::{generate_slug, validate_slug};
pub use store::{MAX_SLUG_ATTEMPTS, NewMapping, UrlStats, UrlStore};
