pub mod keys;
pub mod storage;
pub mod telegram;

use std::fmt;

use async_trait::async_trait;
use teloxide::types::{ChatId, FileMeta};
use thiserror::Error;
use tracing::info;

use self::storage::{S3Storage, SignedLink, StorageError};
use self::telegram::{FetchError, TelegramFetcher};

/// One attachment lifted out of a chat message.
#[derive(Debug, Clone)]
pub struct InboundFile {
    pub file: FileMeta,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub kind: AttachmentKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Document,
    Video,
    Audio,
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AttachmentKind::Document => "document",
            AttachmentKind::Video => "video",
            AttachmentKind::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// Supplies the raw bytes of an attachment.
#[async_trait]
pub trait FileSource {
    async fn fetch(&self, file: &FileMeta) -> Result<Vec<u8>, FetchError>;
}

/// Stores objects and hands out presigned download links.
#[async_trait]
pub trait ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        payload: Vec<u8>,
    ) -> Result<(), StorageError>;

    async fn presigned_get_url(
        &self,
        key: &str,
        file_name: &str,
    ) -> Result<SignedLink, StorageError>;
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("fetching from telegram failed: {0}")]
    Fetch(#[source] FetchError),

    #[error("storing the object failed: {0}")]
    Upload(#[source] StorageError),

    #[error("signing the download link failed: {0}")]
    Sign(#[source] StorageError),
}

impl RelayError {
    /// Short notice for the chat. Provider detail stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            RelayError::Fetch(_) => {
                "⚠️ I could not download that file from Telegram. Please send it again."
            }
            RelayError::Upload(_) => {
                "⚠️ The file could not be stored right now. Please try again later."
            }
            RelayError::Sign(_) => {
                "⚠️ The file was stored, but no download link could be produced. Please send it again."
            }
        }
    }
}

/// Chains the fetch, store and sign steps for one attachment.
pub struct UploadRelay<F, S> {
    source: F,
    store: S,
}

/// Relay wired to the real Telegram and MinIO backends.
pub type Relay = UploadRelay<TelegramFetcher, S3Storage>;

impl<F, S> UploadRelay<F, S>
where
    F: FileSource + Send + Sync,
    S: ObjectStore + Send + Sync,
{
    pub fn new(source: F, store: S) -> Self {
        Self { source, store }
    }

    /// Moves one attachment into the bucket and returns its download link.
    ///
    /// Nothing is written when the fetch fails. When only the signing step
    /// fails the stored object stays behind; the lifecycle rule on the
    /// bucket reclaims it once the link TTL has passed.
    pub async fn handle_file(
        &self,
        chat_id: ChatId,
        inbound: &InboundFile,
    ) -> Result<SignedLink, RelayError> {
        let payload = self
            .source
            .fetch(&inbound.file)
            .await
            .map_err(RelayError::Fetch)?;

        let file_name = keys::sanitize_file_name(inbound.file_name.as_deref());
        let key = keys::storage_key(chat_id, &file_name);

        info!(
            "Uploading {} ({} bytes) as {}",
            inbound.kind,
            payload.len(),
            key
        );

        self.store
            .put_object(&key, inbound.content_type.as_deref(), payload)
            .await
            .map_err(RelayError::Upload)?;

        self.store
            .presigned_get_url(&key, &file_name)
            .await
            .map_err(RelayError::Sign)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use chrono::Utc;

    use super::*;

    fn file_meta() -> FileMeta {
        serde_json::from_value(serde_json::json!({
            "file_id": "BQACAgIAAxkBAAIBOWY",
            "file_unique_id": "AgADyg8AAh3fCUk",
            "file_size": 11,
        }))
        .unwrap()
    }

    fn inbound(file_name: Option<&str>) -> InboundFile {
        InboundFile {
            file: file_meta(),
            file_name: file_name.map(str::to_string),
            content_type: Some("text/plain".to_string()),
            kind: AttachmentKind::Document,
        }
    }

    fn io_fetch_error() -> FetchError {
        FetchError::Download(teloxide::DownloadError::Io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "file is gone").into(),
        ))
    }

    #[derive(Clone)]
    struct FakeSource {
        payload: Vec<u8>,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn returning(payload: &[u8]) -> Self {
            Self {
                payload: payload.to_vec(),
                fail: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                payload: vec![],
                fail: true,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl FileSource for FakeSource {
        async fn fetch(&self, _file: &FileMeta) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                return Err(io_fetch_error());
            }

            Ok(self.payload.clone())
        }
    }

    #[derive(Clone, Default)]
    struct FakeStore {
        fail_put: bool,
        fail_sign: bool,
        puts: Arc<AtomicUsize>,
        signs: Arc<AtomicUsize>,
        stored: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn put_object(
            &self,
            key: &str,
            _content_type: Option<&str>,
            payload: Vec<u8>,
        ) -> Result<(), StorageError> {
            self.puts.fetch_add(1, Ordering::SeqCst);

            if self.fail_put {
                return Err(StorageError::Upload("QuotaExceeded".to_string()));
            }

            self.stored.lock().unwrap().push((key.to_string(), payload));
            Ok(())
        }

        async fn presigned_get_url(
            &self,
            key: &str,
            _file_name: &str,
        ) -> Result<SignedLink, StorageError> {
            self.signs.fetch_add(1, Ordering::SeqCst);

            if self.fail_sign {
                return Err(StorageError::Sign("signer unavailable".to_string()));
            }

            Ok(SignedLink {
                url: format!("http://localhost:9000/uploads/{key}?X-Amz-Expires=86400"),
                expires_at: Utc::now() + std::time::Duration::from_secs(86_400),
            })
        }
    }

    #[tokio::test]
    async fn stores_the_fetched_bytes_and_returns_a_link() {
        let source = FakeSource::returning(b"hello world");
        let store = FakeStore::default();
        let relay = UploadRelay::new(source.clone(), store.clone());

        let link = relay
            .handle_file(ChatId(42), &inbound(Some("notes.txt")))
            .await
            .unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
        assert_eq!(store.signs.load(Ordering::SeqCst), 1);

        let stored = store.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1, b"hello world");
        assert!(stored[0].0.starts_with("42/"), "key: {}", stored[0].0);
        assert!(stored[0].0.ends_with("/notes.txt"), "key: {}", stored[0].0);
        assert!(link.url.contains(&stored[0].0));
    }

    #[tokio::test]
    async fn one_upload_yields_exactly_one_link() {
        let source = FakeSource::returning(b"0123456789");
        let store = FakeStore::default();
        let relay = UploadRelay::new(source, store.clone());

        let link = relay
            .handle_file(ChatId(123), &inbound(Some("a.txt")))
            .await
            .unwrap();

        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
        assert_eq!(store.signs.load(Ordering::SeqCst), 1);

        let stored = store.stored.lock().unwrap();
        assert_eq!(stored[0].1.len(), 10);
        assert!(stored[0].0.starts_with("123/"), "key: {}", stored[0].0);
        assert!(stored[0].0.ends_with("/a.txt"), "key: {}", stored[0].0);

        let remaining = (link.expires_at - Utc::now()).num_seconds();
        assert!(
            (86_340..=86_400).contains(&remaining),
            "remaining: {remaining}"
        );
    }

    #[tokio::test]
    async fn failed_fetch_writes_nothing() {
        let store = FakeStore::default();
        let relay = UploadRelay::new(FakeSource::failing(), store.clone());

        let err = relay
            .handle_file(ChatId(42), &inbound(Some("notes.txt")))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Fetch(_)));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
        assert_eq!(store.signs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_upload_skips_signing() {
        let store = FakeStore {
            fail_put: true,
            ..FakeStore::default()
        };
        let relay = UploadRelay::new(FakeSource::returning(b"data"), store.clone());

        let err = relay
            .handle_file(ChatId(42), &inbound(Some("notes.txt")))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Upload(_)));
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
        assert_eq!(store.signs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_signing_leaves_the_object_behind() {
        let store = FakeStore {
            fail_sign: true,
            ..FakeStore::default()
        };
        let relay = UploadRelay::new(FakeSource::returning(b"data"), store.clone());

        let err = relay
            .handle_file(ChatId(42), &inbound(Some("notes.txt")))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Sign(_)));
        assert_eq!(store.stored.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unnamed_files_fall_back_to_a_generic_name() {
        let store = FakeStore::default();
        let relay = UploadRelay::new(FakeSource::returning(b"data"), store.clone());

        relay.handle_file(ChatId(7), &inbound(None)).await.unwrap();

        let stored = store.stored.lock().unwrap();
        assert!(stored[0].0.ends_with("/file"), "key: {}", stored[0].0);
    }

    #[test]
    fn chat_notices_stay_distinct_per_failure() {
        let fetch = RelayError::Fetch(io_fetch_error());
        let upload = RelayError::Upload(StorageError::Upload("boom".to_string()));
        let sign = RelayError::Sign(StorageError::Sign("boom".to_string()));

        assert_ne!(fetch.user_message(), upload.user_message());
        assert_ne!(upload.user_message(), sign.user_message());
        assert!(sign.user_message().contains("stored"));
    }
}
