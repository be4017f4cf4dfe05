pub use entity::{notifications, users, Id, RelatedEntityId};

pub mod error;
pub mod notification;
pub mod user;
