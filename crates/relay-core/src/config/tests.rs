use super::*;
use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn complete_config() -> Config {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("META_ACCESS_TOKEN", "meta-token"),
        ("WHATSAPP_PHONE_NUMBER_ID", "298133750047072"),
        ("VERIFY_TOKEN", "verify-me"),
    ]));
    cfg
}

#[test]
fn test_defaults() {
    let cfg = Config::default();
    assert_eq!(cfg.provider.model, "gpt-3.5-turbo");
    assert!((cfg.provider.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(
        cfg.provider.fallback_reply,
        "Lo siento, hubo un error al procesar tu mensaje."
    );
    assert_eq!(cfg.api.port, 5000);
    assert_eq!(cfg.locale.timezone, "America/Santiago");
    assert_eq!(cfg.context.timeout_secs, 10);
    assert_eq!(cfg.memory.max_turns_per_sender, 40);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let toml_str = r#"
        [provider]
        model = "gpt-4o-mini"

        [api]
        port = 8080
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.provider.model, "gpt-4o-mini");
    assert!((cfg.provider.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(cfg.api.port, 8080);
    assert_eq!(cfg.api.host, "0.0.0.0");
    assert_eq!(cfg.whatsapp.api_version, "v12.0");
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let cfg = load("/nonexistent/__relay_config__.toml").unwrap();
    assert_eq!(cfg.relay.name, "relay");
}

#[test]
fn test_load_invalid_toml_is_config_error() {
    let tmp = std::env::temp_dir().join("__relay_test_bad_config__.toml");
    std::fs::write(&tmp, "[api\nport = ").unwrap();
    let err = load(tmp.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, RelayError::Config(_)));
    let _ = std::fs::remove_file(&tmp);
}

#[test]
fn test_env_overrides_win() {
    let mut cfg: Config = toml::from_str(
        r#"
        [provider]
        api_key = "from-file"
        [context]
        url = "https://file.example/exec"
        "#,
    )
    .unwrap();
    cfg.apply_env(env(&[
        ("OPENAI_API_KEY", "from-env"),
        ("GOOGLE_SHEETS_URL", "https://script.example/exec"),
        ("PORT", "7000"),
        ("DATABASE_PATH", "/tmp/relay.db"),
    ]));
    assert_eq!(cfg.provider.api_key, "from-env");
    assert_eq!(cfg.context.url, "https://script.example/exec");
    assert_eq!(cfg.api.port, 7000);
    assert_eq!(cfg.memory.db_path, "/tmp/relay.db");
}

#[test]
fn test_env_blank_and_invalid_values_ignored() {
    let mut cfg = Config::default();
    cfg.apply_env(env(&[("OPENAI_API_KEY", "   "), ("PORT", "not-a-port")]));
    assert!(cfg.provider.api_key.is_empty());
    assert_eq!(cfg.api.port, 5000);
}

#[test]
fn test_messages_url_built_from_parts() {
    let cfg = complete_config();
    assert_eq!(
        cfg.whatsapp.messages_url(),
        "https://graph.facebook.com/v12.0/298133750047072/messages"
    );
}

#[test]
fn test_messages_url_override() {
    let mut cfg = complete_config();
    cfg.apply_env(env(&[(
        "WHATSAPP_API_URL",
        "https://graph.facebook.com/v19.0/123/messages",
    )]));
    assert_eq!(
        cfg.whatsapp.messages_url(),
        "https://graph.facebook.com/v19.0/123/messages"
    );
}

#[test]
fn test_validate_complete_config() {
    assert!(complete_config().validate().is_ok());
}

#[test]
fn test_validate_reports_all_missing() {
    let err = Config::default().validate().unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("OPENAI_API_KEY"), "got: {msg}");
    assert!(msg.contains("META_ACCESS_TOKEN"), "got: {msg}");
    assert!(msg.contains("WHATSAPP_PHONE_NUMBER_ID"), "got: {msg}");
    assert!(msg.contains("VERIFY_TOKEN"), "got: {msg}");
}

#[test]
fn test_validate_rejects_bad_timezone() {
    let mut cfg = complete_config();
    cfg.locale.timezone = "Nowhere/Land".into();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_shellexpand_passthrough() {
    assert_eq!(shellexpand("/var/lib/relay.db"), "/var/lib/relay.db");
}
