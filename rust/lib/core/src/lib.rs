pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use config::{ServiceConfig, StorageMode};
pub use error::ServiceError;
pub use module::Module;
pub use types::{
    format_rfc3339, hours_ago_rfc3339, new_id, now_rfc3339, round2,
    start_of_today_rfc3339,
};
