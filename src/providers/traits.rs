use crate::error::LlmError;
use anyhow::Result;
use async_trait::async_trait;
use std::any::Any;

#[async_trait]
pub trait CompletionProvider: Any + Send + Sync {
    async fn new(api_key: String, system_message: String) -> Result<Self>
    where
        Self: Sized;

    /// One prompt in, one reply out. Failures carry a structured kind so
    /// callers can tell network trouble from auth or quota problems.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    async fn get_model_info(&self) -> Result<String>;

    fn get_system_message(&self) -> String;

    fn get_api_key(&self) -> &String;

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync>;
}

impl Clone for Box<dyn CompletionProvider + Send + Sync> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
