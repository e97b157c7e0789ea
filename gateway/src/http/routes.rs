//! Route handlers for the HTTP/SSE surface (C7).

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::GatewayContext;
use crate::logs::parse_since;
use crate::settings::{LlmSettings, WyomingSettings};

use super::sse::chat_completion;

pub type SharedContext = Arc<GatewayContext>;

/// Reports `ok` unless the wyoming TCP listener's most recent `accept()`
/// failed, in which case this degrades to a 503 so an external health check
/// can catch a listener stuck failing to accept new connections.
pub async fn health(State(ctx): State<SharedContext>) -> Response {
    if ctx.metrics.listener_up.get() == 0 {
        (StatusCode::SERVICE_UNAVAILABLE, "listener down").into_response()
    } else {
        "ok".into_response()
    }
}

pub async fn metrics(State(ctx): State<SharedContext>) -> String {
    ctx.metrics.render()
}

pub async fn get_wyoming_settings(State(ctx): State<SharedContext>) -> Json<WyomingSettings> {
    Json((*ctx.settings.wyoming().await).clone())
}

#[derive(Debug, Serialize)]
pub struct SettingsResult {
    pub status: &'static str,
    pub message: String,
}

pub async fn post_wyoming_settings(
    State(ctx): State<SharedContext>,
    Json(next): Json<WyomingSettings>,
) -> Response {
    let known_voices = ctx.known_voice_names();
    let result = ctx
        .settings
        .apply_wyoming(next, &known_voices, &ctx.stt_languages)
        .await;
    match result {
        Ok(()) => Json(SettingsResult {
            status: "ok",
            message: "settings applied".into(),
        })
        .into_response(),
        Err(message) => (StatusCode::BAD_REQUEST, Json(SettingsResult { status: "error", message })).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceEntry {
    pub name: String,
    pub language: String,
}

pub async fn get_voices(State(ctx): State<SharedContext>) -> Json<Vec<VoiceEntry>> {
    Json(
        ctx.voices
            .iter()
            .map(|v| VoiceEntry {
                name: v.name.clone(),
                language: v.language.clone(),
            })
            .collect(),
    )
}

pub async fn get_languages(State(ctx): State<SharedContext>) -> Json<Vec<String>> {
    Json(ctx.stt_languages.clone())
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub since: Option<String>,
    #[serde(rename = "maxCount")]
    pub max_count: Option<usize>,
    pub level: Option<String>,
    pub category: Option<String>,
}

pub async fn get_logs(State(ctx): State<SharedContext>, Query(query): Query<LogsQuery>) -> Response {
    let since = match &query.since {
        Some(raw) => match parse_since(raw) {
            Some(dt) => Some(dt),
            None => return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid since"}))).into_response(),
        },
        None => None,
    };

    let entries = ctx.logs.query(since, query.max_count, query.level.as_deref(), query.category.as_deref());
    let count = entries.len();
    Json(json!({
        "logs": entries,
        "count": count,
        "since": query.since,
    }))
    .into_response()
}

pub async fn list_models(State(ctx): State<SharedContext>) -> Json<Value> {
    let data: Vec<Value> = ctx.llm_models.iter().map(|id| json!({ "id": id })).collect();
    Json(json!({ "data": data }))
}

pub async fn get_llm_settings(State(ctx): State<SharedContext>) -> Json<LlmSettings> {
    Json((*ctx.settings.llm().await).clone())
}

pub async fn post_llm_settings(State(ctx): State<SharedContext>, Json(next): Json<LlmSettings>) -> Json<LlmSettings> {
    ctx.settings.apply_llm(next.clone()).await;
    Json(next)
}

pub async fn chat_completions(State(ctx): State<SharedContext>, Json(request): Json<Value>) -> Response {
    chat_completion(ctx, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::VoiceInfo;
    use crate::logs::LogStore;
    use crate::metrics::Metrics;
    use crate::settings::SettingsStore;
    use crate::worker::{LlmWorker, SttWorker, TtsWorker};
    use wyoming_genx::generators::Mux;
    use wyoming_speech::{AsrMux, TtsMux};

    fn test_context() -> SharedContext {
        Arc::new(GatewayContext {
            settings: Arc::new(SettingsStore::new()),
            metrics: Arc::new(Metrics::new()),
            logs: Arc::new(LogStore::new(10)),
            tts_worker: Arc::new(TtsWorker::new(Arc::new(TtsMux::new()))),
            stt_worker: Arc::new(SttWorker::new(Arc::new(AsrMux::new()))),
            llm_worker: Arc::new(LlmWorker::new(Arc::new(Mux::new()))),
            voices: vec![
                VoiceInfo { name: "amy".into(), language: "en-US".into() },
                VoiceInfo { name: "zira".into(), language: "en-GB".into() },
            ],
            stt_languages: vec!["en-US".into()],
            llm_models: vec!["default".into()],
            connections: crate::connections::ConnectionRegistry::new(),
        })
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let resp = health(State(test_context())).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_unavailable_once_listener_is_down() {
        let ctx = test_context();
        ctx.metrics.listener_up.set(0);
        let resp = health(State(ctx)).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn get_voices_lists_registered_voices() {
        let Json(voices) = get_voices(State(test_context())).await;
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].name, "amy");
    }

    #[tokio::test]
    async fn get_languages_returns_stt_languages() {
        let Json(languages) = get_languages(State(test_context())).await;
        assert_eq!(languages, vec!["en-US".to_string()]);
    }

    #[tokio::test]
    async fn list_models_wraps_ids_in_openai_shape() {
        let Json(body) = list_models(State(test_context())).await;
        assert_eq!(body["data"][0]["id"], "default");
    }

    #[tokio::test]
    async fn post_wyoming_settings_rejects_unknown_voice() {
        let ctx = test_context();
        let bad = WyomingSettings {
            voice_name: Some("nonexistent".into()),
            ..Default::default()
        };
        let resp = post_wyoming_settings(State(ctx.clone()), Json(bad)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_wyoming_settings_accepts_known_voice() {
        let ctx = test_context();
        let good = WyomingSettings {
            voice_name: Some("amy".into()),
            ..Default::default()
        };
        let resp = post_wyoming_settings(State(ctx.clone()), Json(good)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let applied = ctx.settings.wyoming().await;
        assert_eq!(applied.voice_name.as_deref(), Some("amy"));
    }

    #[tokio::test]
    async fn get_llm_settings_roundtrips_through_post() {
        let ctx = test_context();
        let next = LlmSettings {
            model: Some("gpt-4o-mini".into()),
            temperature: Some(0.5),
            max_tokens: None,
            top_p: None,
        };
        let _ = post_llm_settings(State(ctx.clone()), Json(next.clone())).await;
        let Json(current) = get_llm_settings(State(ctx)).await;
        assert_eq!(current.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(current.temperature, Some(0.5));
    }

    #[tokio::test]
    async fn get_logs_rejects_malformed_since() {
        let resp = get_logs(
            State(test_context()),
            Query(LogsQuery {
                since: Some("not-a-timestamp".into()),
                max_count: None,
                level: None,
                category: None,
            }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_logs_returns_empty_set_with_no_entries_yet() {
        let resp = get_logs(
            State(test_context()),
            Query(LogsQuery { since: None, max_count: None, level: None, category: None }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
