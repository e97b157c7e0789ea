//! TTS worker adapter (C8): thin facade over [`wyoming_speech::TtsMux`]
//! presenting the uniform `(text, voiceId?) -> PCM stream` contract the
//! session machine expects.

use std::sync::Arc;

use wyoming_speech::{SynthesisEvent, SynthesisStream, TtsError, TtsMux};

/// Name used to resolve a synthesizer when the caller supplies no voice id.
pub const DEFAULT_VOICE: &str = "default";

pub struct TtsWorker {
    mux: Arc<TtsMux>,
}

impl TtsWorker {
    pub fn new(mux: Arc<TtsMux>) -> Self {
        Self { mux }
    }

    /// Starts synthesizing `text`, resolving to the default voice when
    /// `voice_id` is absent.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: Option<&str>,
    ) -> Result<Box<dyn SynthesisStream>, TtsError> {
        let voice = voice_id.unwrap_or(DEFAULT_VOICE);
        self.mux.synthesize(voice, text).await
    }
}

/// Drains a synthesis stream fully, invoking `on_chunk` for every non-empty
/// PCM buffer, stopping at the `End` sentinel.
pub async fn drain_stream<F>(mut stream: Box<dyn SynthesisStream>, mut on_chunk: F) -> Result<(), TtsError>
where
    F: FnMut(Vec<u8>, wyoming_speech::AudioFormat),
{
    loop {
        match stream.next().await? {
            SynthesisEvent::Chunk(pcm, format) => {
                if !pcm.is_empty() {
                    on_chunk(pcm, format);
                }
            }
            SynthesisEvent::End => return Ok(()),
        }
    }
}
