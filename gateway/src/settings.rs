//! Process-wide settings store.
//!
//! Readers observe a consistent snapshot per request; the HTTP settings
//! handler is the only mutator and publishes a new immutable snapshot on
//! success.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WyomingSettings {
    pub voice_name: Option<String>,
    pub voice_language: Option<String>,
    pub stt_language: Option<String>,
    pub sentence_pause_secs: f64,
    pub synthesis_timeout_base_secs: f64,
}

impl Default for WyomingSettings {
    fn default() -> Self {
        Self {
            voice_name: None,
            voice_language: None,
            stt_language: None,
            sentence_pause_secs: 0.2,
            synthesis_timeout_base_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: None,
            max_tokens: None,
            top_p: None,
        }
    }
}

/// Holds the current settings snapshot behind a lock, published atomically.
pub struct SettingsStore {
    wyoming: RwLock<Arc<WyomingSettings>>,
    llm: RwLock<Arc<LlmSettings>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            wyoming: RwLock::new(Arc::new(WyomingSettings::default())),
            llm: RwLock::new(Arc::new(LlmSettings::default())),
        }
    }

    pub async fn wyoming(&self) -> Arc<WyomingSettings> {
        self.wyoming.read().await.clone()
    }

    pub async fn llm(&self) -> Arc<LlmSettings> {
        self.llm.read().await.clone()
    }

    /// Validates `next` against the given enumerations and, on success,
    /// atomically publishes it. Mutates nothing on failure.
    pub async fn apply_wyoming(
        &self,
        next: WyomingSettings,
        known_voices: &[String],
        known_languages: &[String],
    ) -> Result<(), String> {
        if let Some(name) = &next.voice_name {
            if !known_voices.is_empty() && !known_voices.iter().any(|v| v == name) {
                return Err(format!("unknown voice: {name}"));
            }
        }
        if let Some(lang) = &next.stt_language {
            if !known_languages.is_empty() && !known_languages.iter().any(|l| l == lang) {
                return Err(format!("unknown language: {lang}"));
            }
        }
        *self.wyoming.write().await = Arc::new(next);
        Ok(())
    }

    pub async fn apply_llm(&self, next: LlmSettings) {
        *self.llm.write().await = Arc::new(next);
    }
}

/// Resolves a voice selector down to a concrete voice name.
///
/// Resolution order: explicit name -> explicit language (first match in
/// `available`) -> persisted default -> backend default (`None`, left to
/// the worker to pick).
pub fn resolve_voice(
    selector_name: Option<&str>,
    selector_language: Option<&str>,
    available: &[(String, String)],
    persisted_default: Option<&str>,
) -> Option<String> {
    if let Some(name) = selector_name {
        return Some(name.to_string());
    }
    if let Some(lang) = selector_language {
        if let Some((name, _)) = available.iter().find(|(_, l)| l == lang) {
            return Some(name.clone());
        }
    }
    if let Some(default) = persisted_default {
        return Some(default.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_unknown_voice_without_mutation() {
        let store = SettingsStore::new();
        let next = WyomingSettings {
            voice_name: Some("bogus".into()),
            ..WyomingSettings::default()
        };
        let result = store.apply_wyoming(next, &["alice".to_string()], &[]).await;
        assert!(result.is_err());
        assert!(store.wyoming().await.voice_name.is_none());
    }

    #[tokio::test]
    async fn accepts_known_voice_and_publishes() {
        let store = SettingsStore::new();
        let next = WyomingSettings {
            voice_name: Some("alice".into()),
            ..WyomingSettings::default()
        };
        store
            .apply_wyoming(next, &["alice".to_string()], &[])
            .await
            .unwrap();
        assert_eq!(store.wyoming().await.voice_name.as_deref(), Some("alice"));
    }

    #[test]
    fn resolves_by_name_first() {
        let available = vec![("alice".to_string(), "en-US".to_string())];
        let resolved = resolve_voice(Some("bob"), Some("en-US"), &available, Some("carol"));
        assert_eq!(resolved.as_deref(), Some("bob"));
    }

    #[test]
    fn falls_back_to_language_then_default() {
        let available = vec![("alice".to_string(), "en-US".to_string())];
        assert_eq!(
            resolve_voice(None, Some("en-US"), &available, Some("carol")).as_deref(),
            Some("alice")
        );
        assert_eq!(
            resolve_voice(None, Some("fr-FR"), &available, Some("carol")).as_deref(),
            Some("carol")
        );
        assert_eq!(resolve_voice(None, None, &available, None), None);
    }
}
