use crate::dispatcher::NotificationDispatcher;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;

/// Turns course-side domain events into user notifications.
///
/// Each event is dispatched once per user in its `notify_user_ids`. A failure
/// for one user (typically an unknown id) is logged and the remaining users
/// are still notified.
pub struct NotificationEventHandler {
    dispatcher: NotificationDispatcher,
}

/// Text and related-entity reference for a notification derived from an event.
#[derive(Debug, PartialEq)]
pub(crate) struct NotificationContent {
    pub(crate) message: String,
    pub(crate) related_entity: Option<String>,
    pub(crate) related_entity_id: Option<i64>,
}

impl NotificationContent {
    fn new(message: String, related_entity: &str, related_entity_id: Option<i64>) -> Self {
        Self {
            message,
            related_entity: Some(related_entity.to_string()),
            related_entity_id,
        }
    }
}

impl NotificationEventHandler {
    pub fn new(dispatcher: NotificationDispatcher) -> Self {
        Self { dispatcher }
    }

    pub(crate) fn content_for(event: &DomainEvent) -> NotificationContent {
        match event {
            DomainEvent::CourseApproved {
                course_id,
                course_title,
                ..
            } => NotificationContent::new(
                format!("Your course \"{course_title}\" has been approved."),
                "Course",
                Some(*course_id),
            ),
            DomainEvent::EnrollmentCreated {
                course_id,
                course_title,
                student_name,
                ..
            } => NotificationContent::new(
                format!("{student_name} has enrolled in the course \"{course_title}\"."),
                "Enrollment",
                Some(*course_id),
            ),
            DomainEvent::ModuleAdded {
                course_title,
                module_id,
                module_title,
                ..
            } => NotificationContent::new(
                format!(
                    "A new module \"{module_title}\" has been added to the course \"{course_title}\"."
                ),
                "Module",
                Some(*module_id),
            ),
            DomainEvent::ContentAdded {
                module_title,
                content_id,
                content_title,
                ..
            } => NotificationContent::new(
                format!(
                    "New content \"{content_title}\" has been added to the module \"{module_title}\"."
                ),
                "Content",
                Some(*content_id),
            ),
            DomainEvent::QuizAdded {
                module_title,
                quiz_id,
                quiz_title,
                ..
            } => NotificationContent::new(
                format!("New quiz \"{quiz_title}\" added to {module_title}"),
                "Quiz",
                Some(*quiz_id),
            ),
            DomainEvent::QuizGraded {
                quiz_id,
                quiz_title,
                score,
                ..
            } => NotificationContent::new(
                format!("Your attempt at \"{quiz_title}\" was graded: {score}%."),
                "Quiz",
                Some(*quiz_id),
            ),
            DomainEvent::BadgeEarned { badge, .. } => NotificationContent::new(
                format!("You earned the \"{badge}\" badge!"),
                "Badge",
                None,
            ),
        }
    }
}

#[async_trait]
impl EventHandler for NotificationEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let content = Self::content_for(event);
        let recipients = event.notify_user_ids();

        debug!(
            "Handling {} event for {} recipient(s)",
            event.name(),
            recipients.len()
        );

        for recipient_id in recipients {
            if let Err(e) = self
                .dispatcher
                .notify(
                    *recipient_id,
                    content.message.clone(),
                    content.related_entity.clone(),
                    content.related_entity_id,
                )
                .await
            {
                warn!(
                    "Failed to notify {recipient_id} of {} event: {e:?}",
                    event.name()
                );
            }
        }
    }
}
