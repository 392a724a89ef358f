//! Data models for Nodepad

mod note;
mod user;

pub use note::{Note, NoteFields, NoteId};
pub use user::User;
