use uuid::Uuid;

pub mod prelude;

pub mod notifications;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;

/// Identifier of a course-side record (course, module, quiz, ...) that a
/// notification points back to. Those records live outside this service and
/// use integer keys.
pub type RelatedEntityId = i64;
