//! Password reset mail delivery

use platform::mail::Mailer;

use crate::domain::repository::ResetNotifier;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

const RESET_SUBJECT: &str = "Password Reset Request";

/// Delivers reset links over SMTP, or only logs that it would have when SMTP
/// is not configured
#[derive(Clone)]
pub enum ResetMailNotifier {
    Smtp {
        mailer: Mailer,
        reset_url_base: String,
    },
    LogOnly,
}

impl ResetMailNotifier {
    pub fn smtp(mailer: Mailer, reset_url_base: impl Into<String>) -> Self {
        Self::Smtp {
            mailer,
            reset_url_base: reset_url_base.into(),
        }
    }
}

fn reset_body(link: &str) -> String {
    format!(
        "You requested a password reset.\n\n\
         Open the link below to choose a new password:\n\n\
         {link}\n\n\
         The link is valid for a limited time. If you did not request this, ignore this email."
    )
}

impl ResetNotifier for ResetMailNotifier {
    async fn send_reset_email(&self, email: &Email, reset_token: &str) -> AuthResult<()> {
        match self {
            ResetMailNotifier::Smtp {
                mailer,
                reset_url_base,
            } => {
                let link = format!("{}/{}", reset_url_base.trim_end_matches('/'), reset_token);
                mailer
                    .send_text(email.as_str(), RESET_SUBJECT, reset_body(&link))
                    .await
                    .map_err(|e| AuthError::Internal(e.to_string()))?;
                tracing::info!(domain = %email.domain(), "Password reset email sent");
                Ok(())
            }
            ResetMailNotifier::LogOnly => {
                tracing::warn!(
                    domain = %email.domain(),
                    "SMTP not configured; password reset email not sent"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_body_contains_link() {
        let body = reset_body("http://localhost:3000/auth/reset-password/abc");
        assert!(body.contains("http://localhost:3000/auth/reset-password/abc"));
    }

    #[tokio::test]
    async fn test_log_only_succeeds() {
        let email = Email::new("alice@example.com").unwrap();
        ResetMailNotifier::LogOnly
            .send_reset_email(&email, "token")
            .await
            .unwrap();
    }
}
