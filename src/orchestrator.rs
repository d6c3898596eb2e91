use async_openai::types::{
    ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestToolMessage,
    ChatCompletionRequestToolMessageContent,
    ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent,
};

use crate::{
    llm_provider::LLMProvider,
    prompts,
    tools::{
        ToolOutput,
        executor::ToolExecutor,
        prompts as tool_prompts,
    },
};

/// Progress reported while a turn runs.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    ToolCallStarted { name: String, arguments: String },
    ToolCallCompleted(ToolInvocation),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: String,
    pub output: ToolOutput,
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub tool_calls: Vec<ToolInvocation>,
    pub completion_calls: usize,
    pub response_bytes: usize,
}

/// Answers one query with at most one round of tool calls.
///
/// The first completion is offered every tool. If it asks for any, they run in
/// order, their results are appended as `tool` messages, and a second completion
/// is made with no tools at all, so its text is always the final answer.
pub struct Orchestrator {
    llm_provider: LLMProvider,
    executor: ToolExecutor,
}

impl Orchestrator {
    pub fn new(llm_provider: LLMProvider, executor: ToolExecutor) -> Self {
        Self { llm_provider, executor }
    }

    pub async fn llm_chat<F>(&self, user_query: &str, mut on_event: F) -> anyhow::Result<ChatReply>
    where F: FnMut(TurnEvent) {
        let mut messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(prompts::SYSTEM_PROMPT.to_string()),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(user_query.to_string()),
                name: None,
            }),
        ];

        let mut turn = self
            .llm_provider
            .chat(messages.clone(), Some(tool_prompts::all_tools()))
            .await?;
        let mut completion_calls = 1;
        let mut response_bytes = turn.response_bytes;
        let mut tool_calls = vec![];

        if !turn.tool_calls.is_empty() {
            tracing::info!("Model requested {} tool call(s)", turn.tool_calls.len());
            messages.push(ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessage {
                    content: turn
                        .content
                        .clone()
                        .map(ChatCompletionRequestAssistantMessageContent::Text),
                    tool_calls: Some(turn.tool_calls.clone()),
                    ..Default::default()
                },
            ));

            for call in &turn.tool_calls {
                let name = call.function.name.clone();
                let arguments = call.function.arguments.clone();
                on_event(TurnEvent::ToolCallStarted {
                    name: name.clone(),
                    arguments: arguments.clone(),
                });
                let output = self.executor.run_function_tool(&name, &arguments).await?;
                messages.push(ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                    content: ChatCompletionRequestToolMessageContent::Text(output.to_json()?),
                    tool_call_id: call.id.clone(),
                }));
                let invocation = ToolInvocation {
                    id: call.id.clone(),
                    name,
                    arguments,
                    output,
                };
                tool_calls.push(invocation.clone());
                on_event(TurnEvent::ToolCallCompleted(invocation));
            }

            turn = self.llm_provider.chat(messages, None).await?;
            completion_calls += 1;
            response_bytes += turn.response_bytes;
            if !turn.tool_calls.is_empty() {
                tracing::warn!(
                    "Ignoring {} tool call(s) requested after the tool round",
                    turn.tool_calls.len()
                );
            }
        }

        let text = turn.content.unwrap_or_else(|| prompts::NO_RESPONSE.to_string());
        tracing::info!("LLM: {text}");
        Ok(ChatReply {
            text,
            tool_calls,
            completion_calls,
            response_bytes,
        })
    }
}
