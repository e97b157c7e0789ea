//! Speech-to-text transcription backend interface.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use wyoming_trie::Trie;

use crate::format::AudioFormat;

/// Error type for STT operations.
#[derive(Debug, thiserror::Error)]
pub enum AsrError {
    #[error("transcriber not found: {0}")]
    NotFound(String),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("pattern error: {0}")]
    Pattern(String),
}

/// Called with an interim transcript as the backend produces it.
///
/// Backends that cannot produce partials simply never invoke this; the
/// STT session only ever forwards a `transcript-chunk` for calls that
/// actually occur.
pub type PartialCallback = Box<dyn Fn(String) + Send + Sync>;

/// Interface for a speech-to-text transcription backend.
///
/// A single call covers one complete utterance: the caller accumulates
/// `audio-chunk` payloads into `audio` before invoking `transcribe`, and
/// the backend returns the final transcript once done. Backends that can
/// stream interim results invoke `on_partial` as they become available.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        language: Option<&str>,
        on_partial: Option<PartialCallback>,
    ) -> Result<String, AsrError>;
}

/// A multiplexer that routes transcription requests to a registered
/// backend by language/model name pattern.
pub struct AsrMux {
    routes: Arc<RwLock<Trie<Arc<dyn Transcriber>>>>,
}

impl Default for AsrMux {
    fn default() -> Self {
        Self::new()
    }
}

impl AsrMux {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RwLock::new(Trie::new())),
        }
    }

    /// Registers a transcriber backend for the given name pattern.
    pub async fn handle(&self, pattern: &str, transcriber: Arc<dyn Transcriber>) -> Result<(), AsrError> {
        let mut routes = self.routes.write().await;
        routes
            .set(pattern, |existing| {
                if existing.is_some() {
                    warn!(pattern = %pattern, "asr: transcriber already registered for pattern");
                }
                Ok::<_, wyoming_trie::InvalidPatternError>(transcriber)
            })
            .map_err(|e| AsrError::Pattern(e.to_string()))
    }

    /// Resolves a language/model name to a registered backend and transcribes.
    pub async fn transcribe(
        &self,
        name: &str,
        audio: &[u8],
        format: AudioFormat,
        language: Option<&str>,
        on_partial: Option<PartialCallback>,
    ) -> Result<String, AsrError> {
        let routes = self.routes.read().await;
        let transcriber = routes
            .get(name)
            .ok_or_else(|| AsrError::NotFound(name.to_string()))?;
        transcriber.transcribe(audio, format, language, on_partial).await
    }
}
