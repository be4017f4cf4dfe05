//! Event system infrastructure for the LMS platform.
//!
//! Course-side subsystems (course review, enrollment, module/content/quiz
//! authoring, grading, gamification) publish a [`DomainEvent`] when a user
//! needs to hear about something. Handlers registered with the
//! [`EventPublisher`] turn those events into side effects, the main one being
//! the notification fan-out.
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies.

use async_trait::async_trait;
use log::*;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// Integer key of a course-side record (course, module, quiz, content).
pub type RecordId = i64;

/// Business-level changes that users should be told about.
///
/// Every variant carries the ids of the users to notify. The publishing
/// subsystem decides who those are (e.g. every student enrolled in a course).
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A course submitted for review was approved; notifies its instructor.
    CourseApproved {
        course_id: RecordId,
        course_title: String,
        notify_user_ids: Vec<Id>,
    },
    /// A student enrolled in a course; notifies the student and the instructor.
    EnrollmentCreated {
        course_id: RecordId,
        course_title: String,
        student_name: String,
        notify_user_ids: Vec<Id>,
    },
    /// A module was added to a course; notifies enrolled students.
    ModuleAdded {
        course_title: String,
        module_id: RecordId,
        module_title: String,
        notify_user_ids: Vec<Id>,
    },
    /// Content was added to a module; notifies enrolled students.
    ContentAdded {
        module_title: String,
        content_id: RecordId,
        content_title: String,
        notify_user_ids: Vec<Id>,
    },
    /// A quiz was added to a module; notifies enrolled students.
    QuizAdded {
        module_title: String,
        quiz_id: RecordId,
        quiz_title: String,
        notify_user_ids: Vec<Id>,
    },
    /// A quiz attempt was graded; notifies the student who took it.
    QuizGraded {
        quiz_id: RecordId,
        quiz_title: String,
        score: u32,
        notify_user_ids: Vec<Id>,
    },
    /// A gamification badge was awarded.
    BadgeEarned {
        badge: String,
        notify_user_ids: Vec<Id>,
    },
}

impl DomainEvent {
    /// The users this event should reach.
    pub fn notify_user_ids(&self) -> &[Id] {
        match self {
            DomainEvent::CourseApproved {
                notify_user_ids, ..
            }
            | DomainEvent::EnrollmentCreated {
                notify_user_ids, ..
            }
            | DomainEvent::ModuleAdded {
                notify_user_ids, ..
            }
            | DomainEvent::ContentAdded {
                notify_user_ids, ..
            }
            | DomainEvent::QuizAdded {
                notify_user_ids, ..
            }
            | DomainEvent::QuizGraded {
                notify_user_ids, ..
            }
            | DomainEvent::BadgeEarned {
                notify_user_ids, ..
            } => notify_user_ids,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::CourseApproved { .. } => "course_approved",
            DomainEvent::EnrollmentCreated { .. } => "enrollment_created",
            DomainEvent::ModuleAdded { .. } => "module_added",
            DomainEvent::ContentAdded { .. } => "content_added",
            DomainEvent::QuizAdded { .. } => "quiz_added",
            DomainEvent::QuizGraded { .. } => "quiz_graded",
            DomainEvent::BadgeEarned { .. } => "badge_earned",
        }
    }
}

/// Trait for handling domain events.
/// Implementations perform side effects like sending notifications.
/// Handlers own their failures: nothing is returned to the publisher.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers, one after another.
    pub async fn publish(&self, event: DomainEvent) {
        debug!(
            "Publishing {} event to {} handler(s)",
            event.name(),
            self.handlers.len()
        );
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
