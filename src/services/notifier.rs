//! Overdue notifier
//!
//! Batches overdue lending records per reader and pushes one reminder per
//! reader through the notification transport. A failed delivery only marks
//! that reader's outcome; the rest of the batch still goes out.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::lending::{LendingDetails, ReaderSummary},
    repository::Repository,
};

const REMINDER_SUBJECT: &str = "Overdue Book Reminder - Book Club Library";

/// Outbound delivery channel for reader notifications
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, recipient: &str, subject: &str, body: &str) -> AppResult<()>;
}

/// Per-reader delivery outcome
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotifyOutcome {
    pub success: bool,
    pub recipient: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyStatus {
    /// Reminders were dispatched; see the outcomes
    Sent,
    /// No overdue records, or none with a reachable reader
    NothingToNotify,
}

/// Result digest of one notification run
#[derive(Debug, Serialize, ToSchema)]
pub struct NotifyReport {
    pub status: NotifyStatus,
    /// Overdue records belonging to the readers that were notified
    pub processed_count: usize,
    pub outcomes: Vec<NotifyOutcome>,
}

impl NotifyReport {
    fn nothing_to_notify() -> Self {
        Self {
            status: NotifyStatus::NothingToNotify,
            processed_count: 0,
            outcomes: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct NotifierService {
    repository: Repository,
    transport: Arc<dyn NotificationTransport>,
}

impl NotifierService {
    pub fn new(repository: Repository, transport: Arc<dyn NotificationTransport>) -> Self {
        Self {
            repository,
            transport,
        }
    }

    /// Notify every reader holding overdue books
    pub async fn notify_overdue(&self) -> AppResult<NotifyReport> {
        let overdue = self
            .repository
            .lendings
            .find_overdue(chrono::Utc::now())
            .await?;
        dispatch_reminders(self.transport.as_ref(), overdue).await
    }
}

/// Group overdue records by reader and push one reminder per reader.
///
/// Records whose reader or book cannot be resolved, or whose reader has no
/// usable name or email, are dropped with a warning; they never fail the
/// run and never show up in the outcomes.
pub(crate) async fn dispatch_reminders(
    transport: &dyn NotificationTransport,
    overdue: Vec<LendingDetails>,
) -> AppResult<NotifyReport> {
    let mut groups: IndexMap<Uuid, (ReaderSummary, Vec<LendingDetails>)> = IndexMap::new();

    for record in overdue {
        let Some(reader) = record.reader.clone() else {
            tracing::warn!(
                lending_id = %record.lending_id,
                "Skipping overdue record: reader could not be resolved"
            );
            continue;
        };
        if record.book.is_none() {
            tracing::warn!(
                lending_id = %record.lending_id,
                "Skipping overdue record: book could not be resolved"
            );
            continue;
        }
        if !has_usable_recipient(&reader) {
            tracing::warn!(
                lending_id = %record.lending_id,
                reader_id = %reader.id,
                "Skipping overdue record: reader has no usable name or email"
            );
            continue;
        }

        groups
            .entry(reader.id)
            .or_insert_with(|| (reader, Vec::new()))
            .1
            .push(record);
    }

    if groups.is_empty() {
        return Ok(NotifyReport::nothing_to_notify());
    }

    let processed_count = groups.values().map(|(_, records)| records.len()).sum();
    let mut outcomes = Vec::with_capacity(groups.len());

    for (reader, records) in groups.into_values() {
        let email = reader.email.as_deref().unwrap_or_default();
        let body = render_reminder(&reader.name, &records);

        match transport.deliver(email, REMINDER_SUBJECT, &body).await {
            Ok(()) => outcomes.push(NotifyOutcome {
                success: true,
                recipient: email.to_string(),
                message: format!("Email sent to {email}"),
            }),
            Err(error) => {
                tracing::warn!(reader_id = %reader.id, "Failed to send overdue reminder: {error}");
                outcomes.push(NotifyOutcome {
                    success: false,
                    recipient: email.to_string(),
                    message: format!("Failed to send email to {email}: {error}"),
                });
            }
        }
    }

    Ok(NotifyReport {
        status: NotifyStatus::Sent,
        processed_count,
        outcomes,
    })
}

fn has_usable_recipient(reader: &ReaderSummary) -> bool {
    let has_name = !reader.name.trim().is_empty();
    let has_email = reader
        .email
        .as_deref()
        .map(|email| !email.trim().is_empty())
        .unwrap_or(false);
    has_name && has_email
}

fn render_reminder(name: &str, records: &[LendingDetails]) -> String {
    let book_details = records
        .iter()
        .filter_map(|record| record.book.as_ref().map(|book| (book, record.due_at)))
        .map(|(book, due_at)| format!("Title: {}, Due Date: {}", book.title, due_at.format("%Y-%m-%d")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Dear {name},\n\nYou have the following overdue books:\n{book_details}\n\n\
         Please return them as soon as possible.\n\nThank you,\nBook Club Library"
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::error::AppError;
    use crate::models::lending::BookSummary;

    fn reader(name: &str, email: Option<&str>) -> ReaderSummary {
        ReaderSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.map(str::to_string),
        }
    }

    fn overdue_record(seq: u64, reader: Option<&ReaderSummary>, title: &str) -> LendingDetails {
        let now = Utc::now();
        LendingDetails {
            lending_id: crate::models::lending::LendingId::from_sequence(seq)
                .as_str()
                .to_string(),
            book_id: Uuid::new_v4(),
            reader_id: reader.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
            borrowed_at: now - Duration::days(20),
            due_at: now - Duration::days(3),
            returned: false,
            returned_at: None,
            reader: reader.cloned(),
            book: Some(BookSummary {
                id: Uuid::new_v4(),
                title: title.to_string(),
                author: "Some Author".to_string(),
            }),
            is_overdue: true,
        }
    }

    #[tokio::test]
    async fn groups_records_per_reader_and_sends_one_email_each() {
        let alice = reader("Alice", Some("alice@example.com"));
        let bob = reader("Bob", Some("bob@example.com"));
        let overdue = vec![
            overdue_record(1, Some(&alice), "Dune"),
            overdue_record(2, Some(&bob), "Emma"),
            overdue_record(3, Some(&alice), "Hamlet"),
        ];

        let sent: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = sent.clone();
        let mut transport = MockNotificationTransport::new();
        transport.expect_deliver().returning(move |to, _, body| {
            recorded
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        });

        let report = dispatch_reminders(&transport, overdue).await.unwrap();

        assert_eq!(report.status, NotifyStatus::Sent);
        assert_eq!(report.processed_count, 3);
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes.iter().all(|outcome| outcome.success));

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let alice_body = &sent
            .iter()
            .find(|(to, _)| to == "alice@example.com")
            .unwrap()
            .1;
        assert!(alice_body.contains("Dear Alice"));
        assert!(alice_body.contains("Dune"));
        assert!(alice_body.contains("Hamlet"));
        assert!(!alice_body.contains("Emma"));
        let bob_body = &sent
            .iter()
            .find(|(to, _)| to == "bob@example.com")
            .unwrap()
            .1;
        assert!(bob_body.contains("Emma"));
        assert!(!bob_body.contains("Dune"));
    }

    #[tokio::test]
    async fn readers_without_usable_email_are_skipped() {
        let silent = reader("No Email", None);
        let blank = reader("Blank Email", Some("  "));
        let alice = reader("Alice", Some("alice@example.com"));
        let overdue = vec![
            overdue_record(1, Some(&silent), "Dune"),
            overdue_record(2, Some(&blank), "Emma"),
            overdue_record(3, Some(&alice), "Hamlet"),
        ];

        let mut transport = MockNotificationTransport::new();
        transport
            .expect_deliver()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let report = dispatch_reminders(&transport, overdue).await.unwrap();

        assert_eq!(report.status, NotifyStatus::Sent);
        assert_eq!(report.processed_count, 1);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].recipient, "alice@example.com");
    }

    #[tokio::test]
    async fn unresolved_reader_is_skipped_without_failing_the_run() {
        let alice = reader("Alice", Some("alice@example.com"));
        let overdue = vec![
            overdue_record(1, None, "Dune"),
            overdue_record(2, Some(&alice), "Emma"),
        ];

        let mut transport = MockNotificationTransport::new();
        transport
            .expect_deliver()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let report = dispatch_reminders(&transport, overdue).await.unwrap();
        assert_eq!(report.processed_count, 1);
        assert_eq!(report.outcomes.len(), 1);
    }

    #[tokio::test]
    async fn one_failed_delivery_does_not_abort_the_batch() {
        let alice = reader("Alice", Some("alice@example.com"));
        let bob = reader("Bob", Some("bob@example.com"));
        let overdue = vec![
            overdue_record(1, Some(&alice), "Dune"),
            overdue_record(2, Some(&bob), "Emma"),
        ];

        let mut transport = MockNotificationTransport::new();
        transport
            .expect_deliver()
            .withf(|to, _, _| to == "alice@example.com")
            .returning(|_, _, _| Err(AppError::Transport("connection refused".to_string())));
        transport
            .expect_deliver()
            .withf(|to, _, _| to == "bob@example.com")
            .returning(|_, _, _| Ok(()));

        let report = dispatch_reminders(&transport, overdue).await.unwrap();

        assert_eq!(report.status, NotifyStatus::Sent);
        assert_eq!(report.processed_count, 2);
        assert_eq!(report.outcomes.len(), 2);
        let failed = report
            .outcomes
            .iter()
            .find(|outcome| outcome.recipient == "alice@example.com")
            .unwrap();
        assert!(!failed.success);
        assert!(failed.message.contains("connection refused"));
        let succeeded = report
            .outcomes
            .iter()
            .find(|outcome| outcome.recipient == "bob@example.com")
            .unwrap();
        assert!(succeeded.success);
    }

    #[tokio::test]
    async fn empty_batch_reports_nothing_to_notify() {
        let transport = MockNotificationTransport::new();
        let report = dispatch_reminders(&transport, Vec::new()).await.unwrap();
        assert_eq!(report.status, NotifyStatus::NothingToNotify);
        assert_eq!(report.processed_count, 0);
        assert!(report.outcomes.is_empty());
    }

    #[tokio::test]
    async fn batch_with_only_unreachable_readers_reports_nothing_to_notify() {
        let silent = reader("No Email", None);
        let overdue = vec![overdue_record(1, Some(&silent), "Dune")];

        let transport = MockNotificationTransport::new();
        let report = dispatch_reminders(&transport, overdue).await.unwrap();
        assert_eq!(report.status, NotifyStatus::NothingToNotify);
        assert_eq!(report.processed_count, 0);
        assert!(report.outcomes.is_empty());
    }
}
