//! Outbound mail: password-reset messages over SMTP.
//!
//! When `SMTP_URL` is unset the mailer runs disabled -- reset tokens are
//! still issued and logged, but nothing is sent. This keeps local
//! development and tests free of an SMTP dependency.

use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::AppError;

/// Failure from the SMTP transport. Message passthrough only.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MailerError(pub String);

impl From<MailerError> for AppError {
    fn from(err: MailerError) -> Self {
        AppError::Remote(err.0)
    }
}

struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    reset_url_base: String,
}

/// Password-reset mail sender.
pub struct Mailer {
    inner: Option<SmtpMailer>,
}

impl Mailer {
    /// Build from the environment.
    ///
    /// | Env Var              | Required            | Default                                   |
    /// |----------------------|---------------------|-------------------------------------------|
    /// | `SMTP_URL`           | no (disables mail)  | --                                        |
    /// | `MAIL_FROM`          | when `SMTP_URL` set | --                                        |
    /// | `PASSWORD_RESET_URL` | no                  | `http://localhost:5173/auth?mode=reset`   |
    ///
    /// # Panics
    ///
    /// Panics on a malformed `SMTP_URL` or `MAIL_FROM`; mail
    /// misconfiguration should fail at startup.
    pub fn from_env() -> Self {
        let Ok(smtp_url) = std::env::var("SMTP_URL") else {
            return Self::disabled();
        };
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(&smtp_url)
            .expect("SMTP_URL must be a valid SMTP URL")
            .build();
        let from: Mailbox = std::env::var("MAIL_FROM")
            .expect("MAIL_FROM must be set when SMTP_URL is")
            .parse()
            .expect("MAIL_FROM must be a valid mailbox");
        let reset_url_base = std::env::var("PASSWORD_RESET_URL")
            .unwrap_or_else(|_| "http://localhost:5173/auth?mode=reset".into());
        Self {
            inner: Some(SmtpMailer {
                transport,
                from,
                reset_url_base,
            }),
        }
    }

    /// A mailer that logs instead of sending. Used by tests.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Send the password-reset message for `token` to `to`.
    pub async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), MailerError> {
        let Some(smtp) = &self.inner else {
            tracing::info!(email = to, "SMTP not configured, password reset token issued but not mailed");
            tracing::debug!(token, "password reset token");
            return Ok(());
        };

        let recipient: Mailbox = to
            .parse()
            .map_err(|err| MailerError(format!("Invalid recipient address: {err}")))?;
        let reset_link = format!("{}&token={token}", smtp.reset_url_base);
        let message = Message::builder()
            .from(smtp.from.clone())
            .to(recipient)
            .subject("Reset your password")
            .body(format!(
                "A password reset was requested for your account.\n\n\
                 Open the link below to choose a new password. The link \
                 expires in one hour.\n\n{reset_link}\n\n\
                 If you did not request this, you can ignore this message.\n"
            ))
            .map_err(|err| MailerError(err.to_string()))?;

        smtp.transport
            .send(message)
            .await
            .map_err(|err| MailerError(err.to_string()))?;
        Ok(())
    }
}
