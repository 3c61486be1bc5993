use crate::domain::ports::{Notification, NotificationEvent, Notifier};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, info, warn};

const DELIVERY_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Narrow mail transport contract: deliver to one recipient, report a
/// boolean. The result is logged and not otherwise inspected.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> bool;
}

pub type MailerRef = Arc<dyn Mailer>;

/// Default transport: writes the rendered message to the log. Wiring a real
/// SMTP relay in is deployment glue that stays out of the core.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> bool {
        info!(to = %to, subject = %subject, body_len = body.len(), "mail delivered to log");
        true
    }
}

fn ctx<'a>(context: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    context.get(key).map(String::as_str).unwrap_or("")
}

/// Renders an event's template with its flat key-value context.
pub fn render(event: NotificationEvent, context: &BTreeMap<String, String>) -> (String, String) {
    match event {
        NotificationEvent::OrderConfirmation => (
            format!(
                "Order Confirmation #{} - Kilnstore Studio",
                ctx(context, "order_number")
            ),
            format!(
                "Dear {name},\n\n\
                 Thank you for your order!\n\n\
                 Order Number: {number}\n\
                 Items: {items}\n\
                 Subtotal: \u{20b9}{subtotal}\n\
                 Shipping: \u{20b9}{shipping}\n\
                 Total Amount: \u{20b9}{total}\n\n\
                 Shipping to: {address}\n\n\
                 We'll process your order and send you tracking details soon.\n",
                name = ctx(context, "customer_name"),
                number = ctx(context, "order_number"),
                items = ctx(context, "items"),
                subtotal = ctx(context, "subtotal"),
                shipping = ctx(context, "shipping_charge"),
                total = ctx(context, "total_amount"),
                address = ctx(context, "shipping_address"),
            ),
        ),
        NotificationEvent::AdminOrderAlert => (
            format!("New Order Received - {}", ctx(context, "order_number")),
            format!(
                "New order received!\n\n\
                 Order Number: {number}\n\
                 Customer: {name}\n\
                 Email: {email}\n\
                 Phone: {phone}\n\
                 Items: {items}\n\
                 Total Amount: \u{20b9}{total}\n\n\
                 Shipping Address:\n{address}\n",
                number = ctx(context, "order_number"),
                name = ctx(context, "customer_name"),
                email = ctx(context, "customer_email"),
                phone = ctx(context, "customer_phone"),
                items = ctx(context, "items"),
                total = ctx(context, "total_amount"),
                address = ctx(context, "shipping_address"),
            ),
        ),
        NotificationEvent::CustomOrderReceived => (
            format!(
                "Custom Order Request {} - Kilnstore Studio",
                ctx(context, "request_number")
            ),
            format!(
                "Dear {name},\n\n\
                 We have received your custom order request ({number}).\n\
                 Project type: {project}\n\n\
                 We will contact you within 24 hours to discuss your project.\n",
                name = ctx(context, "customer_name"),
                number = ctx(context, "request_number"),
                project = ctx(context, "project_type"),
            ),
        ),
        NotificationEvent::CustomOrderAdminAlert => (
            format!("New Custom Order: {}", ctx(context, "request_number")),
            format!(
                "New custom order request.\n\n\
                 Request: {number}\n\
                 Customer: {name} <{email}> {phone}\n\
                 Project type: {project}\n\
                 Budget: {budget}\n\n\
                 Brief:\n{brief}\n",
                number = ctx(context, "request_number"),
                name = ctx(context, "customer_name"),
                email = ctx(context, "customer_email"),
                phone = ctx(context, "customer_phone"),
                project = ctx(context, "project_type"),
                budget = ctx(context, "budget"),
                brief = ctx(context, "brief"),
            ),
        ),
    }
}

async fn deliver_once(mailer: &dyn Mailer, note: &Notification) -> bool {
    let (subject, body) = render(note.event, &note.context);
    let delivered = mailer.deliver(&note.recipient, &subject, &body).await;
    if !delivered {
        warn!(
            recipient = %note.recipient,
            event = ?note.event,
            "notification delivery failed"
        );
    }
    delivered
}

/// Sends on the caller's task, best-effort. Failures are logged, never
/// propagated.
pub struct DirectNotifier {
    mailer: MailerRef,
}

impl DirectNotifier {
    pub fn new(mailer: MailerRef) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl Notifier for DirectNotifier {
    async fn notify(&self, note: Notification) {
        deliver_once(self.mailer.as_ref(), &note).await;
    }
}

/// Fire-and-forget dispatch through a bounded in-process queue.
///
/// A background worker drains the queue and retries delivery a bounded number
/// of times. When the queue is full or the worker is gone, the caller falls
/// back to one direct send on its own task; that may add latency but never
/// fails the request.
pub struct QueuedNotifier {
    tx: mpsc::Sender<Notification>,
    mailer: MailerRef,
}

impl QueuedNotifier {
    pub fn spawn(mailer: MailerRef, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity);
        let worker_mailer = mailer.clone();
        tokio::spawn(async move {
            while let Some(note) = rx.recv().await {
                deliver_with_retry(worker_mailer.as_ref(), &note).await;
            }
        });
        Self { tx, mailer }
    }
}

async fn deliver_with_retry(mailer: &dyn Mailer, note: &Notification) {
    for attempt in 1..=DELIVERY_ATTEMPTS {
        if deliver_once(mailer, note).await {
            return;
        }
        if attempt < DELIVERY_ATTEMPTS {
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }
    error!(
        recipient = %note.recipient,
        event = ?note.event,
        attempts = DELIVERY_ATTEMPTS,
        "notification dropped after retries"
    );
}

#[async_trait]
impl Notifier for QueuedNotifier {
    async fn notify(&self, note: Notification) {
        match self.tx.try_send(note) {
            Ok(()) => {}
            Err(TrySendError::Full(note)) | Err(TrySendError::Closed(note)) => {
                warn!("notification queue unavailable, sending directly");
                deliver_once(self.mailer.as_ref(), &note).await;
            }
        }
    }
}
