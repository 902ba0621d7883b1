pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::SQLError;
pub use sqlite::{SqliteConnection, SqliteGateway};
pub use traits::{Row, SQLConnection, SQLGateway, Value};
