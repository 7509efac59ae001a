//! Append-only exchange log: inserts, per-sender transcripts, contact list.

use super::Store;
use relay_core::error::RelayError;
use serde::Serialize;

/// One persisted exchange row. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationRecord {
    pub id: i64,
    pub phone_number: String,
    pub incoming_message: String,
    pub response_message: String,
    /// Server time of insertion, `YYYY-MM-DD HH:MM:SS` (UTC).
    pub timestamp: String,
}

/// A sender and the time of their most recent exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub phone_number: String,
    pub last_message: String,
}

type RecordRow = (i64, String, String, String, String);

fn into_record(row: RecordRow) -> ConversationRecord {
    let (id, phone_number, incoming_message, response_message, timestamp) = row;
    ConversationRecord {
        id,
        phone_number,
        incoming_message,
        response_message,
        timestamp,
    }
}

impl Store {
    /// Insert one exchange stamped with the current server time.
    ///
    /// Every call produces a new row; identical calls are never merged.
    pub async fn append(
        &self,
        phone_number: &str,
        incoming: &str,
        response: &str,
    ) -> Result<i64, RelayError> {
        let result = sqlx::query(
            "INSERT INTO conversations (phone_number, incoming_message, response_message) \
             VALUES (?, ?, ?)",
        )
        .bind(phone_number)
        .bind(incoming)
        .bind(response)
        .execute(&self.pool)
        .await
        .map_err(|e| RelayError::Memory(format!("insert failed: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// All records for a sender, most recent first (dashboard order).
    pub async fn list_by_sender_newest_first(
        &self,
        phone_number: &str,
    ) -> Result<Vec<ConversationRecord>, RelayError> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT id, phone_number, COALESCE(incoming_message, ''), \
             COALESCE(response_message, ''), COALESCE(timestamp, '') \
             FROM conversations WHERE phone_number = ? \
             ORDER BY timestamp DESC, id DESC",
        )
        .bind(phone_number)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelayError::Memory(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(into_record).collect())
    }

    /// All records for a sender in chronological order (transcript replay).
    pub async fn list_by_sender_oldest_first(
        &self,
        phone_number: &str,
    ) -> Result<Vec<ConversationRecord>, RelayError> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT id, phone_number, COALESCE(incoming_message, ''), \
             COALESCE(response_message, ''), COALESCE(timestamp, '') \
             FROM conversations WHERE phone_number = ? \
             ORDER BY timestamp ASC, id ASC",
        )
        .bind(phone_number)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelayError::Memory(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(into_record).collect())
    }

    /// One entry per sender with their latest exchange time, most recent first.
    ///
    /// Timestamps have one-second resolution, so ties fall back to insertion order.
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, RelayError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT phone_number, COALESCE(MAX(timestamp), '') AS last_message \
             FROM conversations \
             GROUP BY phone_number \
             ORDER BY last_message DESC, MAX(id) DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RelayError::Memory(format!("query failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(phone_number, last_message)| Contact {
                phone_number,
                last_message,
            })
            .collect())
    }

    /// Total number of stored records.
    pub async fn count_records(&self) -> Result<i64, RelayError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RelayError::Memory(format!("query failed: {e}")))?;
        Ok(count)
    }
}
