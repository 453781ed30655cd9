use crate::config::ProviderConfig;
use crate::error::LlmError;
use crate::providers::traits::CompletionProvider;
use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequestArgs, Role,
    },
    Client,
};
use async_trait::async_trait;

#[derive(Clone)]
pub struct OpenAIProvider {
    api_key: String,
    system_message: String,
    client: Client<OpenAIConfig>,
    chat_model: String,
}

fn classify_error(e: OpenAIError) -> LlmError {
    match e {
        OpenAIError::Reqwest(e) => LlmError::Network(e.to_string()),
        OpenAIError::JSONDeserialize(e) => LlmError::Malformed(e.to_string()),
        OpenAIError::ApiError(api) => {
            let message = api.message.clone();
            let kind = api.r#type.as_deref().unwrap_or("");
            let lowered = message.to_lowercase();
            if kind == "insufficient_quota"
                || kind == "rate_limit_exceeded"
                || lowered.contains("quota")
                || lowered.contains("rate limit")
            {
                LlmError::Quota(message)
            } else if kind.contains("authentication") || lowered.contains("api key") {
                LlmError::Auth(message)
            } else {
                LlmError::Api(message)
            }
        }
        other => LlmError::Api(other.to_string()),
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn new(api_key: String, system_message: String) -> Result<Self> {
        let config = OpenAIConfig::new().with_api_key(api_key.clone());
        let client = Client::with_config(config);
        let chat_model = ProviderConfig::from_env("openai").model;

        Ok(Self {
            api_key,
            system_message,
            client,
            chat_model,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .messages(vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    role: Role::System,
                    content: self.system_message.clone(),
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    role: Role::User,
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                }),
            ])
            .build()
            .map_err(classify_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_error)?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::Malformed("no response content".to_string()))
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(self.chat_model.clone())
    }

    fn get_system_message(&self) -> String {
        self.system_message.clone()
    }

    fn get_api_key(&self) -> &String {
        &self.api_key
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
