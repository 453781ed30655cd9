pub mod gemini;
pub mod openai;
pub mod traits;

use crate::config::DEFAULT_SYSTEM_MESSAGE;
use crate::providers::gemini::gemini::GeminiProvider;
use crate::providers::openai::openai::OpenAIProvider;
use crate::providers::traits::CompletionProvider;
use anyhow::{anyhow, Result};
use std::env;

/// Build a provider by name, pulling the API key from the matching
/// `{NAME}_API_KEY` variable when none is given explicitly.
pub async fn create_provider(
    name: &str,
    api_key: Option<String>,
) -> Result<Box<dyn CompletionProvider + Send + Sync>> {
    let name = name.to_lowercase();
    let api_key = match api_key {
        Some(key) => key,
        None => {
            let key_var = format!("{}_API_KEY", name.to_uppercase());
            env::var(&key_var)
                .map_err(|_| anyhow!("No API key found for {}. Set {} in your environment.", name, key_var))?
        }
    };

    let system_message = DEFAULT_SYSTEM_MESSAGE.to_string();
    match name.as_str() {
        "openai" => Ok(Box::new(OpenAIProvider::new(api_key, system_message).await?)
            as Box<dyn CompletionProvider + Send + Sync>),
        "gemini" => Ok(Box::new(GeminiProvider::new(api_key, system_message).await?)
            as Box<dyn CompletionProvider + Send + Sync>),
        _ => Err(anyhow!(
            "Unknown provider: {}. Available providers: openai, gemini",
            name
        )),
    }
}
