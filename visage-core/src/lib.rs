pub mod config;
pub mod db;
pub mod encoder;
pub mod ids;
pub mod models;
pub mod store;

pub use config::VisageConfig;
pub use encoder::{EncoderError, FaceEncoderClient};
pub use models::{Session, SessionSummary, UserSession};
pub use store::{PgSessionStore, SessionStore, StoreError};
