//! TTS session state machine (C4).
//!
//! Owned by the connection's single reader task: a session never runs two
//! drains concurrently, so outbound frames for one session can never
//! interleave with its own later frames. Cross-session ordering is handled
//! by each connection having its own sender half of the outbound channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use wyoming_speech::AudioFormat;

use crate::error::GatewayError;
use crate::event::{AudioFormatFields, Event, SynthesizeData, VoiceSelector};
use crate::settings::{resolve_voice, WyomingSettings};
use crate::tts::{sentence, ssml};
use crate::worker::{drain_stream, TtsWorker};

const NON_STREAMING_CHUNK_CAP: usize = 2048;

pub enum TtsSessionState {
    Idle,
    Streaming,
}

struct StreamingCtx {
    voice_id: Option<String>,
    text_buffer: String,
    ssml_mode: bool,
    format: Option<AudioFormat>,
    audio_start_sent: bool,
    had_worker_error: bool,
}

pub struct TtsSession {
    worker: Arc<TtsWorker>,
    out: UnboundedSender<Event>,
    state: TtsSessionState,
    ctx: Option<StreamingCtx>,
}

impl TtsSession {
    pub fn new(worker: Arc<TtsWorker>, out: UnboundedSender<Event>) -> Self {
        Self {
            worker,
            out,
            state: TtsSessionState::Idle,
            ctx: None,
        }
    }

    fn send(&self, event: Event) {
        // The receiver only disappears once the connection is already
        // shutting down; there's nothing to recover by surfacing that here.
        let _ = self.out.send(event);
    }

    pub async fn handle(
        &mut self,
        event: Event,
        settings: &WyomingSettings,
        known_voices: &[(String, String)],
    ) -> Result<(), GatewayError> {
        match (&self.state, event) {
            (TtsSessionState::Idle, Event::Synthesize(data)) => {
                self.run_one_shot(data, settings, known_voices).await
            }
            (TtsSessionState::Idle, Event::SynthesizeStart { voice }) => {
                self.start_streaming(voice, settings, known_voices);
                Ok(())
            }
            (TtsSessionState::Streaming, Event::SynthesizeChunk { text }) => {
                self.append_and_drain(text, settings).await
            }
            (TtsSessionState::Streaming, Event::SynthesizeStop) => self.finish_streaming(settings).await,
            (TtsSessionState::Streaming, Event::Synthesize(_)) => {
                // Non-streaming synthesize is ignored while a streaming
                // session is active.
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn start_streaming(
        &mut self,
        voice: Option<VoiceSelector>,
        settings: &WyomingSettings,
        known_voices: &[(String, String)],
    ) {
        self.state = TtsSessionState::Streaming;
        let voice_id = resolve_voice(
            voice.as_ref().and_then(|v| v.name.as_deref()),
            voice.as_ref().and_then(|v| v.language.as_deref()),
            known_voices,
            settings.voice_name.as_deref(),
        );
        self.ctx = Some(StreamingCtx {
            voice_id,
            text_buffer: String::new(),
            ssml_mode: false,
            format: None,
            audio_start_sent: false,
            had_worker_error: false,
        });
    }

    async fn append_and_drain(
        &mut self,
        text: String,
        settings: &WyomingSettings,
    ) -> Result<(), GatewayError> {
        {
            let ctx = self.ctx.as_mut().expect("streaming state implies ctx");
            ctx.text_buffer.push_str(&text);
            if !ctx.ssml_mode && ssml::looks_ssml_shaped(&ctx.text_buffer) {
                ctx.ssml_mode = true;
            }
        }
        self.drain(settings).await
    }

    async fn finish_streaming(&mut self, settings: &WyomingSettings) -> Result<(), GatewayError> {
        self.drain(settings).await?;
        // Synthesize whatever residue never reached a complete sentence or
        // SSML block boundary.
        let residue = {
            let ctx = self.ctx.as_mut().expect("streaming state implies ctx");
            std::mem::take(&mut ctx.text_buffer)
        };
        if !residue.is_empty() {
            self.synthesize_one(&residue, settings).await;
        }

        let ctx = self.ctx.take().expect("streaming state implies ctx");
        self.send(Event::AudioStop);
        self.send(Event::SynthesizeStopped);
        self.state = TtsSessionState::Idle;

        if ctx.had_worker_error {
            Err(GatewayError::Worker(
                "synthesis failed during streaming session".into(),
            ))
        } else {
            Ok(())
        }
    }

    /// Drains complete sentences (plain mode) or complete `<speak>` blocks
    /// (SSML mode) out of the text buffer, synthesizing each as it
    /// completes. Leaves any incomplete trailing fragment in the buffer.
    async fn drain(&mut self, settings: &WyomingSettings) -> Result<(), GatewayError> {
        loop {
            let ssml_mode = self.ctx.as_ref().expect("streaming state implies ctx").ssml_mode;
            if ssml_mode {
                let buffer = self.ctx.as_ref().unwrap().text_buffer.clone();
                let Some(block) = ssml::parse_speak_block(&buffer) else {
                    break;
                };
                for child in &block.chunks {
                    let chunk = ssml::wrap_chunk(&block.attrs, child);
                    self.synthesize_one(&chunk, settings).await;
                }
                let ctx = self.ctx.as_mut().unwrap();
                ctx.text_buffer.drain(..block.consumed);
                if !ssml::looks_ssml_shaped(&ctx.text_buffer) {
                    ctx.ssml_mode = false;
                }
            } else {
                let buffer = self.ctx.as_ref().unwrap().text_buffer.clone();
                let Some((sentence_text, consumed)) = sentence::extract_sentence(&buffer) else {
                    break;
                };
                self.synthesize_one(&sentence_text, settings).await;
                let ctx = self.ctx.as_mut().unwrap();
                ctx.text_buffer.drain(..consumed);
                self.maybe_emit_pause(settings);
            }
        }
        Ok(())
    }

    fn maybe_emit_pause(&mut self, settings: &WyomingSettings) {
        let ctx = self.ctx.as_mut().expect("streaming state implies ctx");
        if settings.sentence_pause_secs <= 0.0 {
            return;
        }
        let Some(format) = ctx.format else { return };
        let silence = format.silence(Duration::from_secs_f64(settings.sentence_pause_secs));
        drop(ctx);
        self.send_audio_chunk(format, silence);
    }

    /// Synthesizes one already-complete chunk of text (a sentence in plain
    /// mode, or a wrapped `<speak>` child in SSML mode), honoring the
    /// auto-detection safeguard and the per-sentence timeout.
    async fn synthesize_one(&mut self, text: &str, settings: &WyomingSettings) {
        let safe_text = escape_and_wrap_if_plain(text);

        let voice_id = self
            .ctx
            .as_ref()
            .and_then(|ctx| ctx.voice_id.clone());

        let deadline =
            Duration::from_secs_f64(settings.synthesis_timeout_base_secs + 0.05 * text.len() as f64);

        let stream = match self.worker.synthesize(&safe_text, voice_id.as_deref()).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "tts synthesis failed to start");
                if let Some(ctx) = self.ctx.as_mut() {
                    ctx.had_worker_error = true;
                }
                return;
            }
        };

        let result = timeout(deadline, drain_stream(stream, |pcm, format| {
            self.record_format(format);
            self.send_audio_chunk(format, pcm);
        }))
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "tts synthesis failed mid-stream");
                if let Some(ctx) = self.ctx.as_mut() {
                    ctx.had_worker_error = true;
                }
            }
            Err(_) => {
                tracing::warn!("tts per-sentence synthesis deadline exceeded, continuing");
            }
        }
    }

    fn record_format(&mut self, format: AudioFormat) {
        if let Some(ctx) = self.ctx.as_mut() {
            if ctx.format.is_none() {
                ctx.format = Some(format);
            }
        }
    }

    fn send_audio_chunk(&mut self, format: AudioFormat, pcm: Vec<u8>) {
        if pcm.is_empty() {
            return;
        }
        if let Some(ctx) = self.ctx.as_mut() {
            if !ctx.audio_start_sent {
                ctx.audio_start_sent = true;
                self.send(Event::AudioStart(AudioFormatFields::from(format)));
            }
        }
        self.send(Event::AudioChunk(AudioFormatFields::from(format), pcm));
    }

    async fn run_one_shot(
        &mut self,
        data: SynthesizeData,
        settings: &WyomingSettings,
        known_voices: &[(String, String)],
    ) -> Result<(), GatewayError> {
        let voice_id = resolve_voice(
            data.voice.as_ref().and_then(|v| v.name.as_deref()),
            data.voice.as_ref().and_then(|v| v.language.as_deref()),
            known_voices,
            settings.voice_name.as_deref(),
        );
        let safe_text = escape_and_wrap_if_plain(&data.text);
        let stream = self
            .worker
            .synthesize(&safe_text, voice_id.as_deref())
            .await
            .map_err(|e| GatewayError::Worker(e.to_string()))?;

        let mut format: Option<AudioFormat> = None;
        let mut audio = Vec::new();
        drain_stream(stream, |pcm, fmt| {
            if format.is_none() {
                format = Some(fmt);
            }
            audio.extend_from_slice(&pcm);
        })
        .await
        .map_err(|e| GatewayError::Worker(e.to_string()))?;

        let Some(format) = format else {
            return Ok(());
        };
        self.send(Event::AudioStart(AudioFormatFields::from(format)));
        for chunk in audio.chunks(NON_STREAMING_CHUNK_CAP) {
            self.send(Event::AudioChunk(AudioFormatFields::from(format), chunk.to_vec()));
        }
        self.send(Event::AudioStop);
        Ok(())
    }
}

/// Applies the SSML auto-detection safeguard shared by every path that hands
/// text to a TTS backend: plain text containing `<`/`>` is escaped and
/// wrapped so it can't be mis-parsed as markup.
fn escape_and_wrap_if_plain(text: &str) -> String {
    if ssml::looks_ssml_shaped(text) {
        text.to_string()
    } else if text.contains('<') || text.contains('>') {
        ssml::wrap_plain_text(text)
    } else {
        text.to_string()
    }
}
