//! Shared process state threaded through both the TCP listener (C3) and the
//! HTTP/SSE surface (C7).

use std::sync::Arc;

use crate::connections::ConnectionRegistry;
use crate::event::{AsrProgramInfo, AttributionRecord, InfoData, TtsProgramInfo};
use crate::logs::LogStore;
use crate::metrics::Metrics;
use crate::settings::SettingsStore;
use crate::worker::{LlmWorker, SttWorker, TtsWorker};

/// One registered TTS voice, as exposed over `/api/wyoming/tts/voices` and
/// used to validate settings mutations.
#[derive(Debug, Clone)]
pub struct VoiceInfo {
    pub name: String,
    pub language: String,
}

pub struct GatewayContext {
    pub settings: Arc<SettingsStore>,
    pub metrics: Arc<Metrics>,
    pub logs: Arc<LogStore>,
    pub tts_worker: Arc<TtsWorker>,
    pub stt_worker: Arc<SttWorker>,
    pub llm_worker: Arc<LlmWorker>,
    pub voices: Vec<VoiceInfo>,
    pub stt_languages: Vec<String>,
    pub llm_models: Vec<String>,
    pub connections: ConnectionRegistry,
}

impl GatewayContext {
    pub fn describe(&self) -> InfoData {
        let languages: Vec<String> = self
            .voices
            .iter()
            .map(|v| v.language.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        InfoData {
            asr: vec![AsrProgramInfo {
                name: "wyoming-gateway-asr".into(),
                attribution: AttributionRecord {
                    name: "wyoming-gateway".into(),
                    url: String::new(),
                },
                installed: true,
                languages: self.stt_languages.clone(),
                supports_transcript_streaming: false,
            }],
            tts: vec![TtsProgramInfo {
                name: "wyoming-gateway-tts".into(),
                attribution: AttributionRecord {
                    name: "wyoming-gateway".into(),
                    url: String::new(),
                },
                installed: true,
                languages,
                supports_synthesize_streaming: true,
            }],
        }
    }

    pub fn known_voice_names(&self) -> Vec<String> {
        self.voices.iter().map(|v| v.name.clone()).collect()
    }

    pub fn voice_pairs(&self) -> Vec<(String, String)> {
        self.voices.iter().map(|v| (v.name.clone(), v.language.clone())).collect()
    }
}
