use chrono::Utc;
use teloxide::types::ChatId;
use uuid::Uuid;

const FALLBACK_NAME: &str = "file";
const MAX_NAME_LEN: usize = 128;

/// Reduces an arbitrary client-supplied filename to a single ASCII path
/// segment that is safe to embed in an object key and a download URL.
pub fn sanitize_file_name(name: Option<&str>) -> String {
    let Some(name) = name else {
        return FALLBACK_NAME.to_string();
    };

    let mapped: String = name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect();

    // Hidden-file and dot-segment prefixes are not worth preserving.
    let trimmed = mapped.trim_start_matches('.');

    if trimmed.chars().all(|c| c == '_' || c == '.') {
        return FALLBACK_NAME.to_string();
    }

    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// Derives the bucket key for one upload: originating chat, UTC timestamp,
/// a random token and the sanitized filename. The token makes the key
/// unique across concurrent uploads; the trailing filename keeps downloads
/// saving under a sensible name.
pub fn storage_key(chat_id: ChatId, file_name: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d-%H%M%S");
    let token = Uuid::new_v4().simple();

    format!("{chat_id}/{timestamp}-{token}/{file_name}")
}
