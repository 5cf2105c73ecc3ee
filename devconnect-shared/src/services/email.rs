/// Outbound email
///
/// Password reset links are delivered through a [`Mailer`]. Production uses
/// [`SmtpMailer`]; without SMTP credentials the server falls back to
/// [`LogMailer`], which writes the message to the log instead.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

/// Error type for email delivery
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Sender or recipient is not a valid address
    #[error("Invalid email address: {0}")]
    Address(String),

    /// Message could not be assembled
    #[error("Failed to build email: {0}")]
    Build(String),

    /// SMTP delivery failed
    #[error("Failed to send password reset email")]
    Transport(String),
}

/// A rendered email ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Something that can deliver email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// Renders the password reset email for `to`
///
/// The link points at `{frontend_url}/auth/reset-password?token={token}`.
pub fn password_reset_email(to: &str, frontend_url: &str, token: &str) -> OutgoingEmail {
    let reset_url = format!(
        "{}/auth/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    );

    let html = format!(
        r#"
      <h1>Password Reset Request</h1>
      <p>You requested a password reset for your DevConnect account.</p>
      <p>Click the link below to reset your password:</p>
      <a href="{reset_url}">Reset Password</a>
      <p>This link will expire in 1 hour.</p>
      <p>If you didn't request this, please ignore this email.</p>
    "#
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Password Reset Request - DevConnect".to_string(),
        html,
    }
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise
    pub secure: bool,
    pub username: String,
    pub password: String,
}

/// Sends mail through an SMTP relay
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport; no connection is made until the first send
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let from = format!("DevConnect <{}>", config.username)
            .parse::<Mailbox>()
            .map_err(|e| EmailError::Address(e.to_string()))?;

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| EmailError::Transport(e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| EmailError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport.send(message).await.map_err(|e| {
            warn!(error = %e, "Error sending email");
            EmailError::Transport(e.to_string())
        })?;

        info!(to = %email.to, "Email sent");
        Ok(())
    }
}

/// Logs emails instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.html,
            "SMTP not configured, email logged instead of sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_reset_email() {
        let email = password_reset_email("ada@example.com", "http://localhost:3000/", "abc.def.ghi");

        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "Password Reset Request - DevConnect");
        assert!(email
            .html
            .contains(r#"<a href="http://localhost:3000/auth/reset-password?token=abc.def.ghi">"#));
        assert!(email.html.contains("expire in 1 hour"));
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let email = password_reset_email("x@example.com", "http://app", "t");
        assert!(LogMailer.send(email).await.is_ok());
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_sender() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            secure: false,
            username: "not an address".to_string(),
            password: "pw".to_string(),
        };

        assert!(matches!(SmtpMailer::new(&config), Err(EmailError::Address(_))));
    }
}
