use domain::emails::{DisabledEmailSink, EmailSink};
use domain::gateway::mailersend::MailerSendClient;
use domain::{NotificationDispatcher, NotificationEventHandler};
use events::EventPublisher;
use log::*;
use push::ConnectionRegistry;
use service::{config::Config, logging::Logger, AppState};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Starting up LMS Platform notification service...");

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to connect to the database: {e}");
            process::exit(1);
        }
    };

    let mailer = email_sink(&config).await;
    let connection_registry = Arc::new(ConnectionRegistry::new());
    let notification_dispatcher = NotificationDispatcher::new(
        Arc::clone(&db),
        mailer,
        Arc::clone(&connection_registry),
        &config,
    );

    let event_publisher = EventPublisher::new().with_handler(Arc::new(
        NotificationEventHandler::new(notification_dispatcher.clone()),
    ));

    let app_state = web::AppState::new(
        AppState::new(config, &db),
        connection_registry,
        notification_dispatcher,
        event_publisher,
    );

    if let Err(e) = web::init_server(app_state).await {
        error!("Server terminated: {e}");
        process::exit(1);
    }
}

// Without a MailerSend API key notifications are still stored and pushed,
// only the email step is skipped.
async fn email_sink(config: &Config) -> Arc<dyn EmailSink> {
    if config.mailersend_api_key().is_none() {
        warn!("MAILERSEND_API_KEY is not set, notification emails are disabled");
        return Arc::new(DisabledEmailSink);
    }

    match MailerSendClient::new(config).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("Failed to set up MailerSend client, notification emails are disabled: {e:?}");
            Arc::new(DisabledEmailSink)
        }
    }
}
