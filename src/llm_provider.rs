use async_openai::types::{
    ChatCompletionMessageToolCall,
    ChatCompletionRequestMessage,
    ChatCompletionTool,
    ChatCompletionToolChoiceOption,
    CreateChatCompletionRequestArgs,
};
use tokio::time::Instant;

use crate::{
    config::LLMSettings,
    types::{
        FinishReason,
        Response,
    },
};

pub struct LLMProvider {
    settings: LLMSettings,
    http_client: reqwest::Client,
}

/// The assistant message of one completion call.
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ChatCompletionMessageToolCall>,
    pub finish_reason: Option<FinishReason>,
    pub response_bytes: usize,
}

impl LLMProvider {
    pub fn new(settings: LLMSettings) -> anyhow::Result<Self> {
        anyhow::ensure!(!settings.endpoint.is_empty(), "Completion endpoint is not configured");
        anyhow::ensure!(!settings.deployment.is_empty(), "Deployment name is not configured");
        Ok(Self {
            settings,
            http_client: reqwest::Client::new(),
        })
    }

    /// Sends one completion request. With `tools`, the model may choose to call them
    /// (`tool_choice: auto`); without, neither field is sent.
    pub async fn chat(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Option<Vec<ChatCompletionTool>>,
    ) -> anyhow::Result<AssistantTurn> {
        let start = Instant::now();
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.settings.deployment).messages(messages);
        if let Some(tools) = tools {
            args.tools(tools).tool_choice(ChatCompletionToolChoiceOption::Auto);
        }
        let args = args.build()?;

        let response = self
            .http_client
            .post(self.settings.completions_url())
            .query(&[("api-version", self.settings.api_version.as_str())])
            .header("api-key", &self.settings.api_key)
            .json(&args)
            .send()
            .await?;
        let receive_headers = Instant::now();
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            anyhow::bail!("Completion request failed: {status}: {text}");
        }

        let body = response.bytes().await?;
        let receive_body = Instant::now();
        let response: Response = serde_json::from_slice(&body)?;

        tracing::info!("Client timeline:");
        tracing::info!("  Receive headers: {:?}", receive_headers - start);
        tracing::info!("  Receive body: {:?}", receive_body - start);
        if let Some(usage) = &response.usage {
            tracing::info!("Usage: {:?}", usage);
        }

        if response.choices.len() > 1 {
            tracing::warn!("Expected 1 choice, got {}; using the first", response.choices.len());
        }
        let Some(choice) = response.choices.into_iter().next() else {
            anyhow::bail!("Completion response has no choices");
        };
        match choice.finish_reason {
            Some(FinishReason::Stop | FinishReason::ToolCalls) | None => {}
            Some(other) => tracing::warn!("Unexpected finish reason: {other:?}"),
        }
        tracing::info!("Total bytes: {}", body.len());

        Ok(AssistantTurn {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            response_bytes: body.len(),
        })
    }
}
