use crate::domain::error::DomainError;
use crate::domain::user::NewUser;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailService: Send + Sync {
    /// Sends the welcome mail for a freshly created account.
    async fn send_mail(&self, payload: NewUser) -> Result<()>;
}

/// Delivery backend used by [`WelcomeMailService`].
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: MailMessage) -> Result<()>;
}

/// Writes outgoing mail to the log instead of an SMTP relay.
#[derive(Debug, Clone, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn deliver(&self, message: MailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "Mail delivered to log transport"
        );
        Ok(())
    }
}

pub struct WelcomeMailService<T: MailTransport> {
    transport: Arc<T>,
}

impl<T: MailTransport> WelcomeMailService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn render(payload: &NewUser) -> Result<MailMessage> {
        let to = payload
            .mail
            .clone()
            .ok_or_else(|| DomainError::Validation("No recipient address".to_string()))?;

        Ok(MailMessage {
            to,
            subject: format!("Welcome {}!", payload.first_name),
            body: format!(
                "Hello {} {},\n\nYour account \"{}\" has been created. \
                 Log in with this address to start collecting favorite movies.\n",
                payload.first_name, payload.last_name, payload.user_name
            ),
        })
    }
}

#[async_trait]
impl<T: MailTransport> MailService for WelcomeMailService<T> {
    #[instrument(skip(self, payload), fields(user_name = %payload.user_name))]
    async fn send_mail(&self, payload: NewUser) -> Result<()> {
        let message = Self::render(&payload)?;
        self.transport.deliver(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<MailMessage>>,
    }

    #[async_trait]
    impl MailTransport for Outbox {
        async fn deliver(&self, message: MailMessage) -> Result<()> {
            self.sent.lock().await.push(message);
            Ok(())
        }
    }

    fn payload(mail: Option<&str>) -> NewUser {
        NewUser {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            user_name: "Johny".to_string(),
            password: "Qkf5fAbSm".to_string(),
            mail: mail.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_send_mail_delivers_welcome_message() {
        let outbox = Arc::new(Outbox::default());
        let service = WelcomeMailService::new(outbox.clone());

        service.send_mail(payload(Some("john@example.com"))).await.unwrap();

        let sent = outbox.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "john@example.com");
        assert_eq!(sent[0].subject, "Welcome John!");
        assert!(sent[0].body.contains("Johny"));
        assert!(!sent[0].body.contains("Qkf5fAbSm"));
    }

    #[tokio::test]
    async fn test_send_mail_without_recipient_fails() {
        let outbox = Arc::new(Outbox::default());
        let service = WelcomeMailService::new(outbox.clone());

        let err = service.send_mail(payload(None)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
        assert!(outbox.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_log_transport_accepts_messages() {
        let service = WelcomeMailService::new(Arc::new(LogMailTransport));
        assert!(service.send_mail(payload(Some("john@example.com"))).await.is_ok());
    }
}
