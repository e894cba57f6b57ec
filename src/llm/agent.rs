use crate::llm::client::LlmClient;
use crate::tools::ToolRegistry;
use crate::Data;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestToolMessageArgs,
};
use serde_json::Value;
use std::sync::Arc;

pub struct Agent {
    llm: Arc<LlmClient>,
    tools: Arc<ToolRegistry>,
}

impl Agent {
    pub fn new(data: &Data) -> Self {
        Self {
            llm: Arc::new(LlmClient::new(&data.config)),
            tools: data.tools.clone(),
        }
    }

    pub async fn run(
        &self,
        mut messages: Vec<ChatCompletionRequestMessage>,
        max_iterations: usize,
    ) -> anyhow::Result<String> {
        for i in 0..max_iterations {
            tracing::info!("Agent iteration {}/{}", i + 1, max_iterations);

            let tool_definitions = self.tools.get_definitions();
            let response = self
                .llm
                .chat_with_tools(messages.clone(), Some(tool_definitions))
                .await?;
            let choice = response
                .choices
                .first()
                .ok_or_else(|| anyhow::anyhow!("No response from LLM"))?;

            let assistant_message = &choice.message;

            // Convert assistant response to request message for history
            let request_assistant_message = if let Some(tool_calls) = &assistant_message.tool_calls
            {
                ChatCompletionRequestAssistantMessageArgs::default()
                    .tool_calls(tool_calls.clone())
                    .build()?
            } else {
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(assistant_message.content.clone().unwrap_or_default())
                    .build()?
            };

            messages.push(request_assistant_message.into());

            if let Some(tool_calls) = &assistant_message.tool_calls {
                tracing::info!("LLM requested {} tool calls", tool_calls.len());
                for tool_call in tool_calls {
                    let result = self.execute_tool_call(tool_call).await;
                    // Tool failures go back to the model as content rather
                    // than aborting the conversation.
                    let content = match result {
                        Ok(value) => value.to_string(),
                        Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
                    };

                    messages.push(
                        ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(tool_call.id.clone())
                            .content(content)
                            .build()?
                            .into(),
                    );
                }
                // Continue the loop to let the LLM see the results
            } else {
                tracing::info!("Agent task completed after {} iterations", i + 1);
                return Ok(assistant_message
                    .content
                    .clone()
                    .unwrap_or_else(|| "...".to_string()));
            }
        }

        tracing::warn!(
            "Agent exceeded max iterations ({}) - potential runaway loop or recursive tool calls",
            max_iterations
        );
        Err(anyhow::anyhow!(
            "I've reached my reasoning limit for this task ({} steps). Try breaking your request into smaller, more specific steps.",
            max_iterations
        ))
    }

    async fn execute_tool_call(
        &self,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> anyhow::Result<Value> {
        let name = &tool_call.function.name;
        let arguments: Value = serde_json::from_str(&tool_call.function.arguments)?;

        tracing::info!("Agent executing tool: {} with arguments: {}", name, arguments);
        self.tools.execute(name, arguments).await
    }
}
