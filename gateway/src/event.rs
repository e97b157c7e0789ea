//! Typed events over the wire [`Frame`](crate::frame::Frame) (C2).
//!
//! `audio-chunk` is the only tag that carries a non-empty binary payload;
//! its `AudioFormat` fields are inlined into the data JSON alongside it.

use serde::{Deserialize, Serialize};
use wyoming_speech::AudioFormat;

use crate::frame::{Frame, FrameError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFormatFields {
    pub rate: u32,
    pub width: u8,
    pub channels: u8,
}

impl From<AudioFormat> for AudioFormatFields {
    fn from(f: AudioFormat) -> Self {
        Self {
            rate: f.rate,
            width: f.width,
            channels: f.channels,
        }
    }
}

impl AudioFormatFields {
    pub fn into_format(self) -> Result<AudioFormat, wyoming_speech::FormatError> {
        AudioFormat::new(self.rate, self.width, self.channels)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoiceSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SynthesizeData {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceSelector>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranscribeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionRecord {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrProgramInfo {
    pub name: String,
    pub attribution: AttributionRecord,
    pub installed: bool,
    pub languages: Vec<String>,
    pub supports_transcript_streaming: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsProgramInfo {
    pub name: String,
    pub attribution: AttributionRecord,
    pub installed: bool,
    pub languages: Vec<String>,
    pub supports_synthesize_streaming: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InfoData {
    pub asr: Vec<AsrProgramInfo>,
    pub tts: Vec<TtsProgramInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranscriptData {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TranscriptStartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// The closed set of tags the wire protocol speaks.
#[derive(Debug, Clone)]
pub enum Event {
    Describe,
    Info(InfoData),
    Synthesize(SynthesizeData),
    Transcribe(TranscribeData),
    AudioStart(AudioFormatFields),
    AudioChunk(AudioFormatFields, Vec<u8>),
    AudioStop,
    Transcript(TranscriptData),
    TranscriptStart(TranscriptStartData),
    TranscriptChunk(TranscriptData),
    TranscriptStop,
    SynthesizeStart {
        voice: Option<VoiceSelector>,
    },
    SynthesizeChunk {
        text: String,
    },
    SynthesizeStop,
    SynthesizeStopped,
}

impl Event {
    pub fn tag(&self) -> &'static str {
        match self {
            Event::Describe => "describe",
            Event::Info(_) => "info",
            Event::Synthesize(_) => "synthesize",
            Event::Transcribe(_) => "transcribe",
            Event::AudioStart(_) => "audio-start",
            Event::AudioChunk(..) => "audio-chunk",
            Event::AudioStop => "audio-stop",
            Event::Transcript(_) => "transcript",
            Event::TranscriptStart(_) => "transcript-start",
            Event::TranscriptChunk(_) => "transcript-chunk",
            Event::TranscriptStop => "transcript-stop",
            Event::SynthesizeStart { .. } => "synthesize-start",
            Event::SynthesizeChunk { .. } => "synthesize-chunk",
            Event::SynthesizeStop => "synthesize-stop",
            Event::SynthesizeStopped => "synthesize-stopped",
        }
    }

    pub fn into_frame(self) -> Frame {
        let tag = self.tag();
        match self {
            Event::Describe
            | Event::AudioStop
            | Event::TranscriptStop
            | Event::SynthesizeStop
            | Event::SynthesizeStopped => Frame::new(tag),
            Event::Info(data) => with_json(tag, &data),
            Event::Synthesize(data) => with_json(tag, &data),
            Event::Transcribe(data) => with_json(tag, &data),
            Event::AudioStart(fmt) => with_json(tag, &fmt),
            Event::AudioChunk(fmt, pcm) => with_json(tag, &fmt).with_payload(pcm),
            Event::Transcript(data) => with_json(tag, &data),
            Event::TranscriptStart(data) => with_json(tag, &data),
            Event::TranscriptChunk(data) => with_json(tag, &data),
            Event::SynthesizeStart { voice } => with_json(
                tag,
                &SynthesizeData {
                    text: String::new(),
                    voice,
                },
            ),
            Event::SynthesizeChunk { text } => with_json(tag, &SynthesizeChunkData { text }),
        }
    }

    pub fn from_frame(frame: &Frame) -> Result<Event, FrameError> {
        let data = |frame: &Frame| -> Result<&[u8], FrameError> {
            Ok(frame.data.as_deref().unwrap_or(b"{}"))
        };
        let parse = |bytes: &[u8]| -> Result<serde_json::Value, FrameError> {
            serde_json::from_slice(bytes).map_err(|e| FrameError::InvalidHeader(e.to_string()))
        };

        match frame.type_.as_str() {
            "describe" => Ok(Event::Describe),
            "synthesize" => {
                let v = parse(data(frame)?)?;
                Ok(Event::Synthesize(from_value(v)?))
            }
            "transcribe" => {
                let v = parse(data(frame)?)?;
                Ok(Event::Transcribe(from_value(v)?))
            }
            "audio-start" => {
                let v = parse(data(frame)?)?;
                Ok(Event::AudioStart(from_value(v)?))
            }
            "audio-chunk" => {
                let v = parse(data(frame)?)?;
                let fmt: AudioFormatFields = from_value(v)?;
                let payload = frame.payload.clone().unwrap_or_default();
                Ok(Event::AudioChunk(fmt, payload))
            }
            "audio-stop" => Ok(Event::AudioStop),
            "synthesize-start" => {
                let v = parse(data(frame)?)?;
                let data: SynthesizeData = from_value(v)?;
                Ok(Event::SynthesizeStart { voice: data.voice })
            }
            "synthesize-chunk" => {
                let v = parse(data(frame)?)?;
                let data: SynthesizeChunkData = from_value(v)?;
                Ok(Event::SynthesizeChunk { text: data.text })
            }
            "synthesize-stop" => Ok(Event::SynthesizeStop),
            other => Err(FrameError::InvalidHeader(format!("unknown event type `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SynthesizeChunkData {
    text: String,
}

fn with_json<T: Serialize>(tag: &str, data: &T) -> Frame {
    let bytes = serde_json::to_vec(data).expect("event payload always serializes");
    Frame::new(tag).with_data(bytes)
}

fn from_value<T: for<'de> Deserialize<'de>>(v: serde_json::Value) -> Result<T, FrameError> {
    serde_json::from_value(v).map_err(|e| FrameError::InvalidHeader(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_roundtrips_through_frame() {
        let frame = Event::Describe.into_frame();
        assert_eq!(frame.type_, "describe");
        let ev = Event::from_frame(&frame).unwrap();
        assert!(matches!(ev, Event::Describe));
    }

    #[test]
    fn audio_chunk_carries_format_and_payload() {
        let fmt = AudioFormatFields {
            rate: 22050,
            width: 2,
            channels: 1,
        };
        let frame = Event::AudioChunk(fmt, vec![1, 2, 3]).into_frame();
        assert_eq!(frame.type_, "audio-chunk");
        assert!(frame.payload.is_some());
        let ev = Event::from_frame(&frame).unwrap();
        match ev {
            Event::AudioChunk(f, payload) => {
                assert_eq!(f.rate, 22050);
                assert_eq!(payload, vec![1, 2, 3]);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn synthesize_start_carries_voice_selector() {
        let frame = Event::SynthesizeStart {
            voice: Some(VoiceSelector {
                name: Some("alice".into()),
                language: None,
                speaker: None,
            }),
        }
        .into_frame();
        let ev = Event::from_frame(&frame).unwrap();
        match ev {
            Event::SynthesizeStart { voice } => {
                assert_eq!(voice.unwrap().name.as_deref(), Some("alice"));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let frame = Frame::new("wake-word");
        assert!(Event::from_frame(&frame).is_err());
    }
}
