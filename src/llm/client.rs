use crate::config::Config;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionTool, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
    Client,
};
use serde_json::Value;
use std::time::Duration;

pub struct LlmClient {
    chat_client: Client<OpenAIConfig>,
    chat_model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Self {
        let mut chat_config = OpenAIConfig::new().with_api_base(&config.llm_url);

        if let Some(key) = &config.llm_api_key {
            chat_config = chat_config.with_api_key(key);
        } else {
            chat_config = chat_config.with_api_key("unused");
        }

        Self {
            chat_client: Client::with_config(chat_config),
            chat_model: config.llm_model.clone(),
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }

    pub async fn chat(&self, messages: Vec<ChatCompletionRequestMessage>) -> anyhow::Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .messages(messages)
            .build()?;

        let response = tokio::time::timeout(self.timeout, self.chat_client.chat().create(request))
            .await
            .map_err(|_| anyhow::anyhow!("LLM request timed out"))??;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_else(|| "No response from LLM".to_string());

        Ok(content)
    }

    /// Chat completion with tool definitions attached, returning the full
    /// response so the agent loop can inspect tool calls.
    pub async fn chat_with_tools(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Option<Vec<Value>>,
    ) -> anyhow::Result<CreateChatCompletionResponse> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.chat_model).messages(messages);

        if let Some(tools) = tools {
            let tools: Vec<ChatCompletionTool> = tools
                .into_iter()
                .filter_map(|value| serde_json::from_value(value).ok())
                .collect();
            if !tools.is_empty() {
                builder.tools(tools);
            }
        }

        let request = builder.build()?;
        let response = tokio::time::timeout(self.timeout, self.chat_client.chat().create(request))
            .await
            .map_err(|_| anyhow::anyhow!("LLM request timed out"))??;

        Ok(response)
    }
}
