//! Per-sender automated reply toggle (default on).

use super::Store;
use relay_core::error::RelayError;

impl Store {
    /// Whether automated replies are enabled for a sender.
    ///
    /// A sender with no stored row is active.
    pub async fn get_active(&self, phone_number: &str) -> Result<bool, RelayError> {
        let row: Option<(Option<bool>,)> =
            sqlx::query_as("SELECT is_active FROM bot_status WHERE phone_number = ?")
                .bind(phone_number)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RelayError::Memory(format!("query failed: {e}")))?;

        Ok(row.and_then(|(active,)| active).unwrap_or(true))
    }

    /// Insert or overwrite the toggle for a sender.
    pub async fn set_active(&self, phone_number: &str, is_active: bool) -> Result<(), RelayError> {
        sqlx::query(
            "INSERT INTO bot_status (phone_number, is_active) VALUES (?, ?) \
             ON CONFLICT(phone_number) DO UPDATE SET is_active = excluded.is_active",
        )
        .bind(phone_number)
        .bind(is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| RelayError::Memory(format!("upsert failed: {e}")))?;

        Ok(())
    }
}
