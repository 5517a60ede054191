//! The narrator model seam.
//!
//! One blocking generation call per chat turn, over the full prior
//! transcript plus the outgoing utterance. The trait exists so the
//! orchestrator can run against the real Gemini client or a scripted mock.

use async_trait::async_trait;
use gemini::{Content, Gemini, Request, Response};

/// The model behind the narrator.
#[async_trait]
pub trait NarratorModel: Send + Sync {
    /// Generate the next narrator reply for the given conversation.
    async fn narrate(&self, contents: Vec<Content>) -> Result<Response, gemini::Error>;
}

#[async_trait]
impl<T: NarratorModel + ?Sized> NarratorModel for &T {
    async fn narrate(&self, contents: Vec<Content>) -> Result<Response, gemini::Error> {
        (**self).narrate(contents).await
    }
}

/// Generation settings applied to every narrator call.
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    /// Model override; `None` uses the client default.
    pub model: Option<String>,

    /// Cap on reply length, in tokens.
    pub max_output_tokens: Option<usize>,

    /// Temperature for generation.
    pub temperature: Option<f32>,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_output_tokens: None,
            temperature: Some(0.9),
        }
    }
}

/// Gemini-backed narrator.
pub struct GeminiNarrator {
    client: Gemini,
    config: NarratorConfig,
}

impl GeminiNarrator {
    /// Wrap a Gemini client with default generation settings.
    pub fn new(client: Gemini) -> Self {
        Self {
            client,
            config: NarratorConfig::default(),
        }
    }

    /// Create a narrator from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, gemini::Error> {
        Ok(Self::new(Gemini::from_env()?))
    }

    /// Override the generation settings.
    pub fn with_config(mut self, config: NarratorConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl NarratorModel for GeminiNarrator {
    async fn narrate(&self, contents: Vec<Content>) -> Result<Response, gemini::Error> {
        let mut request = Request::new(contents);
        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }
        if let Some(max) = self.config.max_output_tokens {
            request = request.with_max_output_tokens(max);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        self.client.generate(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NarratorConfig::default();
        assert!(config.model.is_none());
        assert_eq!(config.temperature, Some(0.9));
    }

    #[test]
    fn test_narrator_with_config() {
        let narrator = GeminiNarrator::new(Gemini::new("test-key")).with_config(NarratorConfig {
            model: Some("gemini-2.5-pro".to_string()),
            max_output_tokens: Some(1024),
            temperature: None,
        });
        assert_eq!(narrator.config.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(narrator.config.max_output_tokens, Some(1024));
    }
}
