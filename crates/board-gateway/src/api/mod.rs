//! HTTP handlers, one module per resource.

pub mod credentials;
pub mod health;
pub mod messages;

pub use credentials::{list_credentials, register_credential};
pub use health::health_check;
pub use messages::{create_message, delete_message, get_message, search_messages};
