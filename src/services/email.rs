//! Booking notifications: message builders, the outbound queue and its SMTP worker

use std::{str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::{MailData, ReservationDraft},
};

/// Delivers one message
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: &MailData) -> AppResult<()>;
}

/// SMTP delivery through lettre
#[derive(Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(mail: &MailData) -> AppResult<Message> {
        let from = Mailbox::from_str(&mail.from)
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;
        let to = Mailbox::from_str(&mail.to)
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(strip_tags(&mail.content)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(mail.content.clone()),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port)
        .timeout(Some(self.config.send_timeout()));

        let builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, mail: &MailData) -> AppResult<()> {
        let message = Self::build_message(mail)?;
        let transport = self.transport()?;

        // lettre's SMTP client blocks; connect and send happen off the runtime threads
        let send = tokio::task::spawn_blocking(move || transport.send(&message));
        match tokio::time::timeout(self.config.send_timeout(), send).await {
            Err(_) => Err(AppError::Timeout("SMTP send".to_string())),
            Ok(Err(e)) => Err(AppError::Internal(format!("Mail task failed: {}", e))),
            Ok(Ok(Err(e))) => Err(AppError::Internal(format!("Failed to send email: {}", e))),
            Ok(Ok(Ok(_))) => Ok(()),
        }
    }
}

/// Plain text alternative of an HTML body
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.replace("<br>", "\n").chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Producer side of the outbound mail queue
#[derive(Clone)]
pub struct MailQueue {
    sender: mpsc::Sender<MailData>,
}

impl MailQueue {
    /// Bounded queue and the receiver its worker consumes
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<MailData>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Queue a message without waiting. Returns false when it was dropped.
    pub fn enqueue(&self, mail: MailData) -> bool {
        match self.sender.try_send(mail) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(mail)) => {
                tracing::warn!(to = %mail.to, subject = %mail.subject, "Mail queue full, message dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(mail)) => {
                tracing::warn!(to = %mail.to, subject = %mail.subject, "Mail queue closed, message dropped");
                false
            }
        }
    }
}

/// Single consumer sending queued mail one at a time.
///
/// Runs until every `MailQueue` clone is dropped and the queue is empty.
/// Resolves to the number of messages delivered.
pub fn spawn_mail_worker(
    mut receiver: mpsc::Receiver<MailData>,
    sender: Arc<dyn MailSender>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut delivered = 0;
        while let Some(mail) = receiver.recv().await {
            match sender.send(&mail).await {
                Ok(()) => {
                    delivered += 1;
                    tracing::info!("Mail sent successfully from {} to {}", mail.from, mail.to);
                }
                Err(e) => tracing::error!(to = %mail.to, "Error sending mail: {}", e),
            }
        }
        tracing::debug!(delivered, "Mail worker stopped");
        delivered
    })
}

/// Wait for the worker to flush the queue, abandoning it after `timeout`
pub async fn drain_mail_worker(worker: JoinHandle<usize>, timeout: Duration) {
    let abort = worker.abort_handle();
    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(delivered)) => tracing::info!(delivered, "Mail queue drained"),
        Ok(Err(e)) => tracing::error!("Mail worker failed: {}", e),
        Err(_) => {
            abort.abort();
            tracing::warn!("Mail queue not drained within {:?}, remaining messages discarded", timeout);
        }
    }
}

pub const CONFIRMATION_SUBJECT: &str = "Reservation Confirmation";

fn stay_dates(draft: &ReservationDraft) -> (String, String) {
    (
        draft.start_date.format("%Y-%m-%d").to_string(),
        draft.end_date.format("%Y-%m-%d").to_string(),
    )
}

/// Confirmation sent to the guest
pub fn guest_confirmation(draft: &ReservationDraft, config: &EmailConfig) -> MailData {
    let (start, end) = stay_dates(draft);
    let content = format!(
        "<strong>Reservation Confirmation</strong><br>\n\
         Dear {}:<br>\n\
         Your reservation for the {} from {} to {} is now confirmed.",
        crate::views::escape(&draft.guest.first_name),
        crate::views::escape(draft.room_name.as_deref().unwrap_or_default()),
        start,
        end
    );
    MailData {
        to: draft.guest.email.clone(),
        from: config.from.clone(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        content,
    }
}

/// Notice sent to the property owner
pub fn owner_notification(draft: &ReservationDraft, config: &EmailConfig) -> MailData {
    let (start, end) = stay_dates(draft);
    let content = format!(
        "<strong>Reservation Notification</strong><br>\n\
         A reservation has been made for {} by {} {} ({}) from {} to {}.",
        crate::views::escape(draft.room_name.as_deref().unwrap_or_default()),
        crate::views::escape(&draft.guest.first_name),
        crate::views::escape(&draft.guest.last_name),
        crate::views::escape(&draft.guest.email),
        start,
        end
    );
    MailData {
        to: config.owner_address.clone(),
        from: config.from.clone(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn mail(to: &str) -> MailData {
        MailData {
            to: to.to_string(),
            from: "me@here.com".to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            content: "<strong>hi</strong>".to_string(),
        }
    }

    fn draft() -> ReservationDraft {
        let mut draft = ReservationDraft::for_room(
            1,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
        );
        draft.room_name = Some("General's Quarters".to_string());
        draft.guest.first_name = "John".to_string();
        draft.guest.last_name = "Smith".to_string();
        draft.guest.email = "john@smith.com".to_string();
        draft
    }

    #[test]
    fn notifications_address_guest_and_owner() {
        let config = EmailConfig::default();
        let guest = guest_confirmation(&draft(), &config);
        assert_eq!(guest.to, "john@smith.com");
        assert!(guest.content.contains("Dear John"));
        assert!(guest.content.contains("2025-06-01"));

        let owner = owner_notification(&draft(), &config);
        assert_eq!(owner.to, config.owner_address);
        assert!(owner.content.contains("General&#39;s Quarters"));
    }

    #[test]
    fn plain_text_alternative_drops_markup() {
        assert_eq!(
            strip_tags("<strong>Title</strong><br>\n  Dear John:<br>"),
            "Title\nDear John:"
        );
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (queue, _receiver) = MailQueue::channel(1);
        assert!(queue.enqueue(mail("a@b.com")));
        assert!(!queue.enqueue(mail("c@d.com")));
    }

    #[test]
    fn closed_queue_drops() {
        let (queue, receiver) = MailQueue::channel(4);
        drop(receiver);
        assert!(!queue.enqueue(mail("a@b.com")));
    }

    #[tokio::test]
    async fn worker_sends_serially_and_survives_failures() {
        let mut sender = MockMailSender::new();
        let mut seq = mockall::Sequence::new();
        sender
            .expect_send()
            .withf(|m| m.to == "first@here.com")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::Internal("connection refused".into())));
        sender
            .expect_send()
            .withf(|m| m.to == "second@here.com")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let (queue, receiver) = MailQueue::channel(8);
        queue.enqueue(mail("first@here.com"));
        queue.enqueue(mail("second@here.com"));
        let worker = spawn_mail_worker(receiver, Arc::new(sender));
        drop(queue);

        assert_eq!(worker.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn drain_sends_everything_still_queued() {
        let mut sender = MockMailSender::new();
        sender.expect_send().times(3).returning(|_| Ok(()));

        let (queue, receiver) = MailQueue::channel(8);
        for to in ["a@here.com", "b@here.com", "c@here.com"] {
            queue.enqueue(mail(to));
        }
        let worker = spawn_mail_worker(receiver, Arc::new(sender));
        drop(queue);

        drain_mail_worker(worker, Duration::from_secs(5)).await;
    }
}
