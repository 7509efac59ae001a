//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "relay".to_string()
}

pub fn default_data_dir() -> String {
    "~/.relay".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

pub fn default_temperature() -> f32 {
    0.3
}

pub fn default_fallback_reply() -> String {
    "Lo siento, hubo un error al procesar tu mensaje.".to_string()
}

pub fn default_whatsapp_api_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

pub fn default_whatsapp_api_version() -> String {
    "v12.0".to_string()
}

pub fn default_context_timeout_secs() -> u64 {
    10
}

pub fn default_db_path() -> String {
    "~/.relay/data/whatsapp.db".to_string()
}

pub fn default_max_turns_per_sender() -> usize {
    40
}

pub fn default_max_senders() -> usize {
    10_000
}

pub fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_api_port() -> u16 {
    5000
}

pub fn default_timezone() -> String {
    "America/Santiago".to_string()
}

pub fn default_location_label() -> String {
    "Santiago de Chile".to_string()
}
