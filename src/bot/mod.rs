//! Telegram bot handler tree.
//!
//! `schema` builds the dispatcher branches, `commands` answers `/start`
//! and `/help`, and `uploads` relays incoming attachments to object
//! storage.

mod commands;
mod schema;
mod uploads;

pub use commands::Command;
pub use schema::schema;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
