pub(crate) mod email;
pub(crate) mod health;
pub(crate) mod summarize;

pub use email::send_email;
pub use health::health_check;
pub use summarize::summarize;
