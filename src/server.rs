use tokio::{
    sync::mpsc,
    time::Instant,
};

use crate::{
    control::ControlMessage,
    orchestrator::{
        Orchestrator,
        TurnEvent,
    },
    types::TurnStats,
    ui_state::{
        ChatUIModification,
        GeneratingState,
    },
};

/// Handles user messages one at a time until the UI hangs up.
///
/// A failed turn is reported to the UI as an error entry; the session carries on.
pub async fn server_loop(
    ui_tx: mpsc::UnboundedSender<ChatUIModification>,
    mut control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    orchestrator: Orchestrator,
) -> anyhow::Result<()> {
    while let Some(ControlMessage::UserMessage(user_message)) = control_rx.recv().await {
        ui_tx.send(ChatUIModification::AddUserMessage {
            text: user_message.clone(),
        })?;
        ui_tx.send(ChatUIModification::SetGeneratingState {
            state: GeneratingState::Generating,
        })?;

        let start = Instant::now();
        let result = orchestrator
            .llm_chat(&user_message, |event| {
                for modification in modifications_for(event) {
                    if let Err(e) = ui_tx.send(modification) {
                        tracing::warn!("UI is gone, dropping progress update: {e}");
                    }
                }
            })
            .await;

        match result {
            Ok(reply) => {
                ui_tx.send(ChatUIModification::AddAssistantMessage { text: reply.text })?;
                ui_tx.send(ChatUIModification::SetTurnStats {
                    stats: Some(TurnStats {
                        elapsed: start.elapsed(),
                        response_bytes: reply.response_bytes,
                        completion_calls: reply.completion_calls,
                    }),
                })?;
            }
            Err(e) => {
                tracing::error!("Turn failed: {e:?}");
                ui_tx.send(ChatUIModification::AddErrorMessage { text: format!("{e:#}") })?;
                ui_tx.send(ChatUIModification::SetTurnStats { stats: None })?;
            }
        }
        ui_tx.send(ChatUIModification::SetGeneratingState {
            state: GeneratingState::Idle,
        })?;
        tracing::info!("Turn finished in {:?}", start.elapsed());
    }
    tracing::info!("Server loop ended");
    anyhow::Ok(())
}

fn modifications_for(event: TurnEvent) -> Vec<ChatUIModification> {
    match event {
        TurnEvent::ToolCallStarted { name, .. } => vec![ChatUIModification::SetGeneratingState {
            state: GeneratingState::RunningTool { name },
        }],
        TurnEvent::ToolCallCompleted(invocation) => vec![
            ChatUIModification::AddToolCall {
                name: invocation.name,
                args: invocation.arguments,
                result: invocation.output,
            },
            ChatUIModification::SetGeneratingState {
                state: GeneratingState::Generating,
            },
        ],
    }
}
