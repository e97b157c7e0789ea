//! STT session state machine (C5).
//!
//! Unlike TTS, STT has no mid-collection output: the whole point is to
//! guarantee `transcript-start` precedes every `transcript-chunk`, which
//! precedes the final `transcript`, which precedes `transcript-stop`.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use wyoming_speech::AudioFormat;

use crate::error::GatewayError;
use crate::event::{Event, TranscribeData, TranscriptData, TranscriptStartData};
use crate::worker::SttWorker;

pub enum SttSessionState {
    Idle,
    Collecting,
}

struct CollectingCtx {
    language: Option<String>,
    format: Option<AudioFormat>,
    audio: Vec<u8>,
}

pub struct SttSession {
    worker: Arc<SttWorker>,
    out: UnboundedSender<Event>,
    state: SttSessionState,
    ctx: Option<CollectingCtx>,
}

impl SttSession {
    pub fn new(worker: Arc<SttWorker>, out: UnboundedSender<Event>) -> Self {
        Self {
            worker,
            out,
            state: SttSessionState::Idle,
            ctx: None,
        }
    }

    fn send(&self, event: Event) {
        let _ = self.out.send(event);
    }

    /// Events outside `Collecting` (other than the `transcribe` that starts
    /// it) are silently discarded, per the transition table.
    pub async fn handle(&mut self, event: Event) -> Result<(), GatewayError> {
        match (&self.state, event) {
            (SttSessionState::Idle, Event::Transcribe(data)) => {
                self.start_collecting(data);
                Ok(())
            }
            (SttSessionState::Collecting, Event::AudioStart(fields)) => {
                let format = fields.into_format()?;
                self.ctx.as_mut().expect("collecting implies ctx").format = Some(format);
                Ok(())
            }
            (SttSessionState::Collecting, Event::AudioChunk(_, payload)) => {
                self.ctx
                    .as_mut()
                    .expect("collecting implies ctx")
                    .audio
                    .extend_from_slice(&payload);
                Ok(())
            }
            (SttSessionState::Collecting, Event::AudioStop) => self.finish().await,
            _ => Ok(()),
        }
    }

    fn start_collecting(&mut self, data: TranscribeData) {
        self.state = SttSessionState::Collecting;
        self.ctx = Some(CollectingCtx {
            language: data.language,
            format: None,
            audio: Vec::new(),
        });
    }

    async fn finish(&mut self) -> Result<(), GatewayError> {
        let ctx = self.ctx.take().expect("collecting implies ctx");
        self.state = SttSessionState::Idle;

        let format = ctx
            .format
            .unwrap_or_else(|| AudioFormat::new(16000, 2, 1).expect("fallback format is valid"));

        self.send(Event::TranscriptStart(TranscriptStartData {
            language: ctx.language.clone(),
        }));

        let out = self.out.clone();
        let language = ctx.language.clone();
        let on_partial: wyoming_speech::PartialCallback = Box::new(move |text| {
            let _ = out.send(Event::TranscriptChunk(TranscriptData {
                text,
                language: language.clone(),
            }));
        });

        let result = self
            .worker
            .transcribe(&ctx.audio, format, ctx.language.as_deref(), Some(on_partial))
            .await;

        match result {
            Ok(text) => {
                self.send(Event::Transcript(TranscriptData {
                    text,
                    language: ctx.language,
                }));
                self.send(Event::TranscriptStop);
                Ok(())
            }
            Err(e) => {
                self.send(Event::TranscriptStop);
                Err(GatewayError::Worker(e.to_string()))
            }
        }
    }
}
