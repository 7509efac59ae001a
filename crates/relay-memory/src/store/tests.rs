use super::Store;

/// Create an in-memory store for testing.
async fn test_store() -> Store {
    Store::in_memory().await.unwrap()
}

#[tokio::test]
async fn test_get_active_defaults_to_true() {
    let store = test_store().await;
    assert!(store.get_active("+1555").await.unwrap());
    assert!(store.get_active("").await.unwrap());
}

#[tokio::test]
async fn test_set_active_upserts() {
    let store = test_store().await;

    store.set_active("+1555", false).await.unwrap();
    assert!(!store.get_active("+1555").await.unwrap());

    store.set_active("+1555", true).await.unwrap();
    assert!(store.get_active("+1555").await.unwrap());

    store.set_active("+1555", false).await.unwrap();
    assert!(!store.get_active("+1555").await.unwrap());

    // Only one row per sender.
    let (rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bot_status")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);

    // Other senders are unaffected.
    assert!(store.get_active("+1666").await.unwrap());
}

#[tokio::test]
async fn test_append_never_merges() {
    let store = test_store().await;
    let a = store.append("+1555", "Hola", "Hola!").await.unwrap();
    let b = store.append("+1555", "Hola", "Hola!").await.unwrap();
    assert_ne!(a, b);

    let records = store.list_by_sender_oldest_first("+1555").await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(store.count_records().await.unwrap(), 2);
}

#[tokio::test]
async fn test_append_stores_fields_and_timestamp() {
    let store = test_store().await;
    store
        .append("+1555", "Hola", "Hola, ¿en qué puedo ayudarte?")
        .await
        .unwrap();

    let records = store.list_by_sender_oldest_first("+1555").await.unwrap();
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.phone_number, "+1555");
    assert_eq!(r.incoming_message, "Hola");
    assert_eq!(r.response_message, "Hola, ¿en qué puedo ayudarte?");
    // CURRENT_TIMESTAMP format: YYYY-MM-DD HH:MM:SS
    assert_eq!(r.timestamp.len(), 19, "unexpected timestamp: {}", r.timestamp);
}

#[tokio::test]
async fn test_outbound_only_record_has_empty_incoming() {
    let store = test_store().await;
    store.append("+1555", "", "Operator here").await.unwrap();
    let records = store.list_by_sender_newest_first("+1555").await.unwrap();
    assert_eq!(records[0].incoming_message, "");
    assert_eq!(records[0].response_message, "Operator here");
}

#[tokio::test]
async fn test_list_orderings_are_mirrored() {
    let store = test_store().await;
    store.append("+1555", "one", "1").await.unwrap();
    store.append("+1555", "two", "2").await.unwrap();
    store.append("+1666", "other", "x").await.unwrap();
    store.append("+1555", "three", "3").await.unwrap();

    let oldest: Vec<String> = store
        .list_by_sender_oldest_first("+1555")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.incoming_message)
        .collect();
    assert_eq!(oldest, vec!["one", "two", "three"]);

    let newest: Vec<String> = store
        .list_by_sender_newest_first("+1555")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.incoming_message)
        .collect();
    assert_eq!(newest, vec!["three", "two", "one"]);
}

#[tokio::test]
async fn test_list_unknown_sender_is_empty() {
    let store = test_store().await;
    assert!(store
        .list_by_sender_oldest_first("+0000")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_list_contacts_grouped_by_recency() {
    let store = test_store().await;
    store.append("+1555", "a", "b").await.unwrap();
    store.append("+1666", "c", "d").await.unwrap();
    store.append("+1555", "e", "f").await.unwrap();
    store.append("+1666", "g", "h").await.unwrap();

    let contacts = store.list_contacts().await.unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].phone_number, "+1666");
    assert_eq!(contacts[1].phone_number, "+1555");
    assert!(!contacts[0].last_message.is_empty());
}

#[tokio::test]
async fn test_list_contacts_respects_stored_timestamps() {
    let store = test_store().await;
    // Explicit timestamps to check ordering is by time, not insertion.
    sqlx::query(
        "INSERT INTO conversations (phone_number, incoming_message, response_message, timestamp) \
         VALUES ('+1555', 'late', '', '2026-05-01 12:00:00'), \
                ('+1666', 'early', '', '2026-04-01 12:00:00')",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let contacts = store.list_contacts().await.unwrap();
    assert_eq!(contacts[0].phone_number, "+1555");
    assert_eq!(contacts[0].last_message, "2026-05-01 12:00:00");
    assert_eq!(contacts[1].phone_number, "+1666");
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let store = test_store().await;
    Store::run_migrations(store.pool()).await.unwrap();
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}
