use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::services::{storage::SignedLink, AttachmentKind, InboundFile, Relay};

use super::HandlerError;

/// Picks the attachment to relay out of a message.
///
/// Documents win over videos, videos over audio. Media the relay does not
/// handle, photos included, is left alone.
pub fn extract_attachment(msg: &Message) -> Option<InboundFile> {
    if let Some(document) = msg.document() {
        return Some(InboundFile {
            file: document.file.clone(),
            file_name: document.file_name.clone(),
            content_type: document.mime_type.as_ref().map(|m| m.to_string()),
            kind: AttachmentKind::Document,
        });
    }

    if let Some(video) = msg.video() {
        return Some(InboundFile {
            file: video.file.clone(),
            file_name: video.file_name.clone(),
            content_type: video.mime_type.as_ref().map(|m| m.to_string()),
            kind: AttachmentKind::Video,
        });
    }

    if let Some(audio) = msg.audio() {
        return Some(InboundFile {
            file: audio.file.clone(),
            file_name: audio.file_name.clone(),
            content_type: audio.mime_type.as_ref().map(|m| m.to_string()),
            kind: AttachmentKind::Audio,
        });
    }

    None
}

/// Relays one attachment and answers the chat with exactly one message,
/// either the download link or a failure notice.
pub async fn handle_attachment(
    bot: Bot,
    msg: Message,
    inbound: InboundFile,
    relay: Arc<Relay>,
) -> Result<(), HandlerError> {
    info!(
        "Received {} \"{}\" in chat {}",
        inbound.kind,
        inbound.file_name.as_deref().unwrap_or("unnamed"),
        msg.chat.id
    );

    let reply = match relay.handle_file(msg.chat.id, &inbound).await {
        Ok(link) => success_text(&link),
        Err(err) => {
            error!("Relay failed in chat {}: {err}", msg.chat.id);
            err.user_message().to_string()
        }
    };

    if let Err(err) = bot.send_message(msg.chat.id, reply).await {
        warn!("Could not reply in chat {}: {err}", msg.chat.id);
    }

    Ok(())
}

fn success_text(link: &SignedLink) -> String {
    format!(
        "✅ File stored.\n\nLink (valid until {}):\n{}",
        link.expires_at.format("%Y-%m-%d %H:%M UTC"),
        link.url
    )
}
