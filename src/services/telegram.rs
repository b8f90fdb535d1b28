use async_trait::async_trait;
use teloxide::{net::Download, prelude::Requester, types::FileMeta, Bot};
use thiserror::Error;

use super::FileSource;

/// Errors raised while pulling attachment bytes out of Telegram.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("telegram API request failed: {0}")]
    Api(#[from] teloxide::RequestError),

    #[error("file download failed: {0}")]
    Download(#[from] teloxide::DownloadError),
}

/// Fetches attachment bytes through the Bot API.
pub struct TelegramFetcher {
    bot: Bot,
}

impl TelegramFetcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl FileSource for TelegramFetcher {
    async fn fetch(&self, file: &FileMeta) -> Result<Vec<u8>, FetchError> {
        let remote = self.bot.get_file(file.id.clone()).await?;

        let mut payload = Vec::with_capacity(file.size as usize);
        self.bot.download_file(&remote.path, &mut payload).await?;

        Ok(payload)
    }
}
