//! Text-to-speech synthesis backend interface.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;
use wyoming_trie::Trie;

use crate::format::AudioFormat;

/// Error type for TTS operations.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("synthesizer not found: {0}")]
    NotFound(String),
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),
    #[error("synthesis timed out")]
    Timeout,
    #[error("pattern error: {0}")]
    Pattern(String),
}

/// One PCM buffer produced during synthesis, or the end-of-synthesis sentinel.
///
/// The backend is expected to yield `Chunk` events carrying non-empty PCM
/// data until synthesis completes, then exactly one `End`.
#[derive(Debug, Clone)]
pub enum SynthesisEvent {
    Chunk(Vec<u8>, AudioFormat),
    End,
}

/// A lazily-produced sequence of synthesis events for a single synthesize call.
#[async_trait]
pub trait SynthesisStream: Send {
    async fn next(&mut self) -> Result<SynthesisEvent, TtsError>;
}

/// Interface for a text-to-speech synthesizer backend.
///
/// Implementations may be invoked concurrently across sessions; within a
/// single session, calls are made sequentially by the TTS session machine.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Begins synthesizing `text` (plain text or a single SSML chunk) using
    /// the given voice, returning a stream of PCM buffers.
    async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<Box<dyn SynthesisStream>, TtsError>;
}

/// A multiplexer that routes synthesis requests to a registered backend by
/// voice name pattern.
pub struct TtsMux {
    routes: Arc<RwLock<Trie<Arc<dyn Synthesizer>>>>,
}

impl Default for TtsMux {
    fn default() -> Self {
        Self::new()
    }
}

impl TtsMux {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RwLock::new(Trie::new())),
        }
    }

    /// Registers a synthesizer backend for the given voice name pattern.
    pub async fn handle(&self, pattern: &str, synthesizer: Arc<dyn Synthesizer>) -> Result<(), TtsError> {
        let mut routes = self.routes.write().await;
        routes
            .set(pattern, |existing| {
                if existing.is_some() {
                    warn!(pattern = %pattern, "tts: synthesizer already registered for pattern");
                }
                Ok::<_, wyoming_trie::InvalidPatternError>(synthesizer)
            })
            .map_err(|e| TtsError::Pattern(e.to_string()))
    }

    /// Resolves a voice id to a registered backend and starts synthesis.
    pub async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
    ) -> Result<Box<dyn SynthesisStream>, TtsError> {
        let routes = self.routes.read().await;
        let synth = routes
            .get(voice_id)
            .ok_or_else(|| TtsError::NotFound(voice_id.to_string()))?;
        synth.synthesize(text, Some(voice_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptySynth;

    #[async_trait]
    impl Synthesizer for EmptySynth {
        async fn synthesize(
            &self,
            _text: &str,
            _voice_id: Option<&str>,
        ) -> Result<Box<dyn SynthesisStream>, TtsError> {
            struct S(bool);
            #[async_trait]
            impl SynthesisStream for S {
                async fn next(&mut self) -> Result<SynthesisEvent, TtsError> {
                    if self.0 {
                        self.0 = false;
                        Ok(SynthesisEvent::Chunk(vec![0u8; 4], AudioFormat::new(22050, 2, 1).unwrap()))
                    } else {
                        Ok(SynthesisEvent::End)
                    }
                }
            }
            Ok(Box::new(S(true)))
        }
    }

    #[tokio::test]
    async fn not_found_without_registration() {
        let mux = TtsMux::new();
        let result = mux.synthesize("default", "hi").await;
        assert!(matches!(result, Err(TtsError::NotFound(_))));
    }

    #[tokio::test]
    async fn routes_to_registered_backend() {
        let mux = TtsMux::new();
        mux.handle("default", Arc::new(EmptySynth)).await.unwrap();
        let mut stream = mux.synthesize("default", "hi").await.unwrap();
        match stream.next().await.unwrap() {
            SynthesisEvent::Chunk(data, fmt) => {
                assert_eq!(data.len(), 4);
                assert_eq!(fmt.rate, 22050);
            }
            SynthesisEvent::End => panic!("expected chunk first"),
        }
        assert!(matches!(stream.next().await.unwrap(), SynthesisEvent::End));
    }
}
