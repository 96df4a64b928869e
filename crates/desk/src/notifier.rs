//! Order confirmation mail
//!
//! Delivery is best effort. Mails are sent from a detached task after the
//! order is stored; failures end up in the logs and counters, never in an
//! HTTP response.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use parking_lot::Mutex;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use config::MailSettings;
use observability::{DeskMetrics, NotificationOutcome};

use crate::error::NotifyError;
use crate::types::Order;

const SMTP_TIMEOUT: Duration = Duration::from_secs(15);
const PLACEHOLDER: &str = "-";

/// A fully addressed plain-text mail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
}

/// Mail transport - protocol agnostic
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand one mail to the transport
    async fn send(&self, mail: OutgoingMail) -> Result<(), NotifyError>;
}

// ==================== SMTP Implementation ====================

/// SMTP relay over implicit TLS, authenticated with the mail identity
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. No connection is opened until the first send.
    pub fn new(settings: &MailSettings) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(mail.from)
            .to(mail.to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(())
    }
}

// ==================== Mock Implementation ====================

/// Mailer that records every attempt instead of sending
pub struct MockMailer {
    attempts: Mutex<Vec<OutgoingMail>>,
    failure: Option<String>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Configure every send to fail with a transport error
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Mails handed to this mailer so far, failed ones included
    pub fn attempts(&self) -> Vec<OutgoingMail> {
        self.attempts.lock().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().len()
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), NotifyError> {
        self.attempts.lock().push(mail);

        match &self.failure {
            Some(reason) => Err(NotifyError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}

// ==================== Template ====================

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn or_placeholder(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(PLACEHOLDER)
}

/// Render the confirmation mail for a stored order
///
/// Absent fields are shown as `-`. Fails if the recipient is not a valid
/// address.
pub fn confirmation_mail(
    order: &Order,
    recipient: &str,
    from: &Mailbox,
) -> Result<OutgoingMail, NotifyError> {
    let to = parse_mailbox(recipient)?;
    let details = &order.details;

    let student = or_placeholder(&details.student_name);
    let title = or_placeholder(&details.project_title);

    let body = format!(
        "Hello {student},\n\
         \n\
         Thank you for your order. We have received the following details:\n\
         \n\
         Student name: {student}\n\
         Mobile: {mobile}\n\
         Project title: {title}\n\
         Project domain: {domain}\n\
         Serial number: {serial}\n\
         \n\
         Our team will contact you shortly.\n",
        mobile = or_placeholder(&details.mobile),
        domain = or_placeholder(&details.project_domain),
        serial = or_placeholder(&details.project_serial),
    );

    Ok(OutgoingMail {
        from: from.clone(),
        to,
        subject: format!("Order received: {}", title),
        body,
    })
}

// ==================== Notifier ====================

struct MailRoute {
    mailer: Arc<dyn Mailer>,
    from: Mailbox,
}

/// Fire-and-forget confirmation sender
///
/// Cloning is cheap; clones share the mailer and the task tracker.
#[derive(Clone)]
pub struct Notifier {
    route: Option<Arc<MailRoute>>,
    tracker: TaskTracker,
}

impl Notifier {
    /// A notifier that never sends anything
    pub fn disabled() -> Self {
        Self {
            route: None,
            tracker: TaskTracker::new(),
        }
    }

    /// Notifier over an arbitrary mailer
    ///
    /// # Arguments
    /// * `mailer` - Transport used for every delivery
    /// * `from` - Sender mailbox, e.g. `"Desk <desk@example.com>"`
    pub fn new(mailer: Arc<dyn Mailer>, from: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            route: Some(Arc::new(MailRoute {
                mailer,
                from: parse_mailbox(from)?,
            })),
            tracker: TaskTracker::new(),
        })
    }

    /// SMTP notifier from configuration; `None` yields a disabled notifier
    pub fn from_settings(settings: Option<&MailSettings>) -> Result<Self, NotifyError> {
        match settings {
            Some(settings) => {
                let from = settings.sender().to_string();
                let mailer = SmtpMailer::new(settings)?;
                Self::new(Arc::new(mailer), &from)
            }
            None => Ok(Self::disabled()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.route.is_some()
    }

    /// Deliveries spawned but not yet finished
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Send the confirmation for `order` on a detached task
    ///
    /// Returns immediately. Nothing is spawned when mail is disabled or the
    /// order carries no address.
    pub fn dispatch(&self, order: Order) {
        if self.route.is_none() || order.email().is_none() {
            self.skip(&order);
            return;
        }

        let notifier = self.clone();
        self.tracker.spawn(async move {
            notifier.deliver(&order).await;
        });
    }

    /// Send the confirmation for `order` and wait for the outcome
    ///
    /// Errors are logged and counted, never returned.
    pub async fn deliver(&self, order: &Order) -> NotificationOutcome {
        let (route, recipient) = match (&self.route, order.email()) {
            (Some(route), Some(recipient)) => (route, recipient),
            _ => return self.skip(order),
        };

        let result = match confirmation_mail(order, recipient, &route.from) {
            Ok(mail) => route.mailer.send(mail).await,
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(()) => {
                info!(order_id = %order.id, "Confirmation mail sent");
                NotificationOutcome::Sent
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Confirmation mail failed");
                NotificationOutcome::Failed
            }
        };

        DeskMetrics::notification(outcome);
        outcome
    }

    fn skip(&self, order: &Order) -> NotificationOutcome {
        if self.route.is_none() {
            debug!(order_id = %order.id, "Mail disabled, confirmation skipped");
        } else {
            debug!(order_id = %order.id, "Order has no email, confirmation skipped");
        }
        DeskMetrics::notification(NotificationOutcome::Skipped);
        NotificationOutcome::Skipped
    }

    /// Wait up to `grace` for spawned deliveries
    ///
    /// Returns `true` if every delivery finished in time.
    pub async fn drain(&self, grace: Duration) -> bool {
        self.tracker.close();
        tokio::time::timeout(grace, self.tracker.wait()).await.is_ok()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("enabled", &self.is_enabled())
            .field("pending", &self.pending())
            .finish()
    }
}
