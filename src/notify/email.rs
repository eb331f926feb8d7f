use anyhow::{anyhow, Context, Result};
use lettre::message::{header::ContentType, Attachment, Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use std::path::PathBuf;

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP delivery settings. Built only when every required value is present.
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub to: String,
    pub from: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("to", &self.to)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl MailConfig {
    /// `SMTP_HOST`, `SMTP_PORT` (587), `SMTP_USER`, `SMTP_PASS`, `MAIL_TO`,
    /// `MAIL_FROM` (defaults to the SMTP user).
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Option<Self> {
        let value = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match value("SMTP_PORT") {
            None => DEFAULT_SMTP_PORT,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid SMTP_PORT, using {DEFAULT_SMTP_PORT}");
                DEFAULT_SMTP_PORT
            }),
        };
        let host = value("SMTP_HOST")?;
        let user = value("SMTP_USER")?;
        let pass = value("SMTP_PASS")?;
        let to = value("MAIL_TO")?;
        let from = value("MAIL_FROM").unwrap_or_else(|| user.clone());

        Some(Self {
            host,
            port,
            user,
            pass,
            to,
            from,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub path: PathBuf,
    pub mime: String,
}

/// Subject, both body variants and the files to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub attachments: Vec<MailAttachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailStatus {
    Sent,
    /// Delivery configuration is incomplete.
    Skipped,
    /// Configured, but building or sending the message failed.
    Failed,
}

fn attachment_part(att: &MailAttachment) -> Result<lettre::message::SinglePart> {
    let data = std::fs::read(&att.path)
        .with_context(|| format!("reading attachment {}", att.path.display()))?;
    let content_type = ContentType::parse(&att.mime)
        .map_err(|e| anyhow!("invalid mime type `{}`: {:?}", att.mime, e))?;
    let filename = att
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    Ok(Attachment::new(filename).body(data, content_type))
}

/// Build the multipart message. Unreadable attachments are logged and skipped.
pub fn build_message(cfg: &MailConfig, mail: &DigestEmail) -> Result<Message> {
    let from: Mailbox = cfg.from.parse().context("invalid MAIL_FROM")?;
    let to: Mailbox = cfg.to.parse().context("invalid MAIL_TO")?;

    let mut body = MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
        mail.text_body.clone(),
        mail.html_body.clone(),
    ));
    for att in &mail.attachments {
        match attachment_part(att) {
            Ok(part) => body = body.singlepart(part),
            Err(e) => {
                tracing::warn!(error = ?e, path = %att.path.display(), "attachment skipped");
            }
        }
    }

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .multipart(body)
        .context("build email")
}

/// Best-effort delivery via STARTTLS. Without configuration this only warns.
pub async fn send_email(cfg: Option<&MailConfig>, mail: &DigestEmail) -> Result<MailStatus> {
    let Some(cfg) = cfg else {
        tracing::warn!("mail not sent: SMTP/recipient settings missing");
        return Ok(MailStatus::Skipped);
    };

    let msg = build_message(cfg, mail)?;
    let creds = Credentials::new(cfg.user.clone(), cfg.pass.clone());
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
        .context("invalid SMTP_HOST")?
        .port(cfg.port)
        .credentials(creds)
        .build();

    mailer.send(msg).await.context("send email")?;
    tracing::info!(to = %cfg.to, subject = %mail.subject, "digest mail sent");
    Ok(MailStatus::Sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    fn full() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USER", "digest@example.com"),
            ("SMTP_PASS", "secret"),
            ("MAIL_TO", "team@example.com"),
        ]
    }

    #[test]
    fn complete_config_defaults_port_and_sender() {
        let cfg = MailConfig::from_lookup(lookup(&full())).unwrap();
        assert_eq!(cfg.port, 587);
        assert_eq!(cfg.from, "digest@example.com");
        assert!(!format!("{cfg:?}").contains("secret"));
    }

    #[test]
    fn any_missing_required_value_disables_mail() {
        for skip in ["SMTP_HOST", "SMTP_USER", "SMTP_PASS", "MAIL_TO"] {
            let pairs: Vec<_> = full().into_iter().filter(|(k, _)| *k != skip).collect();
            assert!(MailConfig::from_lookup(lookup(&pairs)).is_none(), "{skip}");
        }
    }

    #[test]
    fn invalid_port_falls_back() {
        let mut pairs = full();
        pairs.push(("SMTP_PORT", "abc"));
        assert_eq!(MailConfig::from_lookup(lookup(&pairs)).unwrap().port, 587);
    }

    #[tokio::test]
    async fn missing_config_is_skipped_not_an_error() {
        let mail = DigestEmail {
            subject: "s".into(),
            html_body: "<p>h</p>".into(),
            text_body: "t".into(),
            attachments: vec![],
        };
        assert_eq!(send_email(None, &mail).await.unwrap(), MailStatus::Skipped);
    }

    #[test]
    fn unreadable_attachment_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("digest_2025-10-14.csv");
        std::fs::write(&csv, "region\r\n").unwrap();

        let cfg = MailConfig::from_lookup(lookup(&full())).unwrap();
        let mail = DigestEmail {
            subject: "Daily Digest".into(),
            html_body: "<p>h</p>".into(),
            text_body: "t".into(),
            attachments: vec![
                MailAttachment {
                    path: dir.path().join("missing.csv"),
                    mime: "text/csv".into(),
                },
                MailAttachment {
                    path: csv,
                    mime: "text/csv".into(),
                },
            ],
        };
        let msg = build_message(&cfg, &mail).unwrap();
        let raw = String::from_utf8_lossy(&msg.formatted()).into_owned();
        assert!(raw.contains("digest_2025-10-14.csv"));
        assert!(!raw.contains("missing.csv"));
        assert!(raw.contains("text/csv"));
        assert!(raw.contains("text/html"));
    }
}
