//! Outbound mail boundary.
//!
//! Delivery is out of scope for the service itself; the default
//! implementation writes messages to the log so the reset flow stays fully
//! observable in development.

pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str);
}

pub struct TracingMailer;

impl Mailer for TracingMailer {
    fn send(&self, to: &str, subject: &str, body: &str) {
        tracing::info!(to, subject, body, "outgoing mail");
    }
}
