pub mod email;

pub use email::{send_email, DigestEmail, MailAttachment, MailConfig, MailStatus};
