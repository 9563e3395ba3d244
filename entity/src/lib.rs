pub mod access_log;
pub mod url;

pub mod prelude {
    pub use super::access_log::Entity as AccessLog;
    pub use super::url::Entity as Url;
}
