pub use super::notifications::Entity as Notifications;
pub use super::users::Entity as Users;
