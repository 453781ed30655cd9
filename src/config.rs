use std::env;

/// Default system message handed to every provider.
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a document analysis assistant. Answer questions strictly from the \
     document content you are given. If the content does not answer the \
     question, reply with an empty answer.";

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub model: String,
    pub api_url: String,
    pub temperature: f32,
}

impl ProviderConfig {
    pub fn from_env(provider: &str) -> Self {
        let prefix = provider.to_uppercase();

        // Get model from env or use defaults
        let model = env::var(format!("{}_MODEL", prefix)).unwrap_or_else(|_| {
            match provider {
                "openai" => "gpt-4-turbo-preview",
                "gemini" => "gemini-pro",
                _ => "",
            }
            .to_string()
        });

        // Get API URL from env or use default
        let api_url = env::var(format!("{}_API_URL", prefix)).unwrap_or_else(|_| {
            match provider {
                "openai" => "https://api.openai.com/v1/chat/completions".to_string(),
                "gemini" => {
                    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
                }
                _ => String::new(),
            }
        });

        // Get temperature from env or use default
        let temperature = env::var(format!("{}_TEMPERATURE", prefix))
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0.7);

        Self {
            model,
            api_url,
            temperature,
        }
    }
}

/// Default cap on extracted characters per document.
pub const DEFAULT_MAX_DOC_CHARS: usize = 5000;

/// Knobs for text extraction.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Extracted text is truncated to this many characters to bound the
    /// prompt size of downstream LLM calls. `None` keeps the whole
    /// document (the chunker bounds prompts instead).
    pub max_chars: Option<usize>,
    /// Tesseract data path, if the system install needs one.
    pub ocr_datapath: Option<String>,
    /// OCR language, e.g. "eng".
    pub ocr_lang: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_chars: Some(
                env::var("DOCQA_MAX_DOC_CHARS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_DOC_CHARS),
            ),
            ocr_datapath: env::var("TESSDATA_PREFIX").ok(),
            ocr_lang: env::var("DOCQA_OCR_LANG").unwrap_or_else(|_| "eng".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_defaults() {
        let config = ProviderConfig::from_env("openai");
        assert_eq!(config.model, "gpt-4-turbo-preview");
        assert!(config.api_url.contains("api.openai.com"));
    }

    #[test]
    fn unknown_provider_is_empty() {
        let config = ProviderConfig::from_env("nonexistent");
        assert!(config.model.is_empty());
        assert!(config.api_url.is_empty());
    }
}
