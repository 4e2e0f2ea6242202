mod provider;
mod smtp;

pub use provider::{MailProvider, Mailer};
pub use smtp::SmtpMailer;
