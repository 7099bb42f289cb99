//! Lending record model and the lending identifier scheme

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Prefix carried by every lending identifier
const LENDING_ID_PREFIX: &str = "LENDB";
/// Minimum width of the zero-padded numeric suffix; grows past 999
const LENDING_ID_PAD: usize = 3;

static LENDING_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^LENDB[0-9]{3,}$").unwrap());

/// Human-readable lending identifier (`LENDB001`, `LENDB002`, ...).
///
/// This is the canonical external key of a lending record; the serial
/// storage key never leaves the repository layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct LendingId(String);

impl LendingId {
    /// First identifier of the sequence
    pub fn first() -> Self {
        Self::from_sequence(1)
    }

    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!(
            "{}{:0pad$}",
            LENDING_ID_PREFIX,
            sequence,
            pad = LENDING_ID_PAD
        ))
    }

    /// Parse an identifier supplied by a caller
    pub fn parse(value: &str) -> AppResult<Self> {
        if LENDING_ID_RE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::Validation("Invalid lending ID".to_string()))
        }
    }

    /// Numeric suffix of the identifier
    pub fn sequence(&self) -> u64 {
        self.0[LENDING_ID_PREFIX.len()..].parse().unwrap_or(0)
    }

    /// The identifier following this one
    pub fn next(&self) -> Self {
        Self::from_sequence(self.sequence() + 1)
    }

    /// Successor of the most recently allocated identifier. Starts the
    /// sequence over at 1 when there is no usable predecessor.
    pub fn next_after(last: Option<&str>) -> Self {
        match last.and_then(|value| Self::parse(value).ok()) {
            Some(id) => id.next(),
            None => Self::first(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LendingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lending record as stored
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lending {
    /// Internal storage key; allocation order only, never exposed
    #[serde(skip_serializing)]
    pub id: i32,
    pub lending_id: String,
    pub book_id: Uuid,
    pub reader_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Lending {
    /// An active lending whose due date has passed
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.returned && self.due_at < now
    }
}

/// Reader identity merged into a lending record at read time
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReaderSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

/// Book identity merged into a lending record at read time
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
}

/// Lending record enriched with reader and book identity for display.
///
/// The reader and book are resolved by a read-time join, never stored;
/// either may be absent when the referenced row has since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LendingDetails {
    pub lending_id: String,
    pub book_id: Uuid,
    pub reader_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
    pub reader: Option<ReaderSummary>,
    pub book: Option<BookSummary>,
    pub is_overdue: bool,
}
