//! STT worker adapter (C8): thin facade over [`wyoming_speech::AsrMux`].

use std::sync::Arc;

use wyoming_speech::{AsrError, AsrMux, AudioFormat, PartialCallback};

pub const DEFAULT_MODEL: &str = "default";

pub struct SttWorker {
    mux: Arc<AsrMux>,
}

impl SttWorker {
    pub fn new(mux: Arc<AsrMux>) -> Self {
        Self { mux }
    }

    /// Transcribes `audio`, invoking `on_partial` for each interim result
    /// the backend produces and returning only once the final transcript is
    /// resolved.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        language: Option<&str>,
        on_partial: Option<PartialCallback>,
    ) -> Result<String, AsrError> {
        self.mux
            .transcribe(DEFAULT_MODEL, audio, format, language, on_partial)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wyoming_speech::Transcriber;

    struct CountingTranscriber;

    #[async_trait]
    impl Transcriber for CountingTranscriber {
        async fn transcribe(
            &self,
            audio: &[u8],
            _format: AudioFormat,
            _language: Option<&str>,
            on_partial: Option<PartialCallback>,
        ) -> Result<String, AsrError> {
            if let Some(cb) = on_partial {
                cb("partial one".to_string());
                cb("partial one two".to_string());
            }
            Ok(format!("final transcript for {} bytes", audio.len()))
        }
    }

    #[tokio::test]
    async fn forwards_partials_then_returns_final() {
        let mux = Arc::new(AsrMux::new());
        mux.handle(DEFAULT_MODEL, Arc::new(CountingTranscriber)).await.unwrap();
        let worker = SttWorker::new(mux);

        let partials = Arc::new(Mutex::new(Vec::new()));
        let p2 = partials.clone();
        let cb: PartialCallback = Box::new(move |text| p2.lock().unwrap().push(text));

        let format = AudioFormat::new(16000, 2, 1).unwrap();
        let transcript = worker
            .transcribe(&[0u8; 4], format, Some("en-US"), Some(cb))
            .await
            .unwrap();

        assert_eq!(transcript, "final transcript for 4 bytes");
        assert_eq!(partials.lock().unwrap().len(), 2);
    }
}
