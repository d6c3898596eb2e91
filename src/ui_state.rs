use crate::{
    tools::ToolOutput,
    types::TurnStats,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratingState {
    Idle,
    Generating,
    RunningTool { name: String },
}

/// The conversation as the UI shows it. Entries are only ever appended.
#[derive(Debug, Clone)]
pub struct ChatUIState {
    messages: Vec<ChatUIMessage>,
    generating_state: GeneratingState,
    turn_stats: Option<TurnStats>,
}

impl ChatUIState {
    pub fn messages(&self) -> &[ChatUIMessage] {
        &self.messages
    }

    pub fn generating_state(&self) -> &GeneratingState {
        &self.generating_state
    }

    pub fn is_idle(&self) -> bool {
        self.generating_state == GeneratingState::Idle
    }

    pub fn turn_stats(&self) -> &Option<TurnStats> {
        &self.turn_stats
    }
}

#[derive(Debug, Clone)]
pub enum ChatUIModification {
    AddUserMessage { text: String },
    AddAssistantMessage { text: String },
    AddToolCall { name: String, args: String, result: ToolOutput },
    AddErrorMessage { text: String },

    SetGeneratingState { state: GeneratingState },
    SetTurnStats { stats: Option<TurnStats> },
}

impl ChatUIState {
    pub fn new() -> Self {
        Self {
            messages: vec![],
            generating_state: GeneratingState::Idle,
            turn_stats: None,
        }
    }

    pub fn apply(&mut self, modification: ChatUIModification) {
        match modification {
            ChatUIModification::AddUserMessage { text } => {
                self.messages.push(ChatUIMessage::User(ChatUIUserMessage { text }));
            }
            ChatUIModification::AddAssistantMessage { text } => {
                self.messages
                    .push(ChatUIMessage::Assistant(ChatUIAssistantMessage { text }));
            }
            ChatUIModification::AddToolCall { name, args, result } => {
                self.messages
                    .push(ChatUIMessage::ToolCall(ChatUIToolCall { name, args, result }));
            }
            ChatUIModification::AddErrorMessage { text } => {
                self.messages.push(ChatUIMessage::Error(text));
            }
            ChatUIModification::SetGeneratingState { state } => {
                self.generating_state = state;
            }
            ChatUIModification::SetTurnStats { stats } => {
                self.turn_stats = stats;
            }
        }
    }
}

impl Default for ChatUIState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum ChatUIMessage {
    User(ChatUIUserMessage),
    Assistant(ChatUIAssistantMessage),
    ToolCall(ChatUIToolCall),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ChatUIUserMessage {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ChatUIAssistantMessage {
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ChatUIToolCall {
    pub name: String,
    pub args: String,
    pub result: ToolOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_appended_in_order() {
        let mut state = ChatUIState::new();
        assert!(state.is_idle());

        state.apply(ChatUIModification::AddUserMessage {
            text: "What's the weather in Paris?".to_string(),
        });
        state.apply(ChatUIModification::SetGeneratingState {
            state: GeneratingState::RunningTool {
                name: "get_weather".to_string(),
            },
        });
        assert!(!state.is_idle());
        state.apply(ChatUIModification::AddToolCall {
            name: "get_weather".to_string(),
            args: r#"{"city":"Paris"}"#.to_string(),
            result: ToolOutput::Weather {
                temp: 18.5,
                desc: "light rain".to_string(),
            },
        });
        state.apply(ChatUIModification::AddAssistantMessage {
            text: "It's 18.5°C with light rain in Paris.".to_string(),
        });
        state.apply(ChatUIModification::SetGeneratingState {
            state: GeneratingState::Idle,
        });

        let messages = state.messages();
        assert_eq!(messages.len(), 3);
        assert!(matches!(&messages[0], ChatUIMessage::User(u) if u.text.starts_with("What's")));
        assert!(matches!(&messages[1], ChatUIMessage::ToolCall(tc) if tc.name == "get_weather"));
        assert!(matches!(&messages[2], ChatUIMessage::Assistant(a) if a.text.contains("Paris")));
        assert!(state.is_idle());
    }

    #[test]
    fn errors_are_kept_as_entries() {
        let mut state = ChatUIState::new();
        state.apply(ChatUIModification::AddUserMessage { text: "Hello".to_string() });
        state.apply(ChatUIModification::AddErrorMessage {
            text: "connection refused".to_string(),
        });
        state.apply(ChatUIModification::AddUserMessage { text: "Hello?".to_string() });
        assert_eq!(state.messages().len(), 3);
        assert!(matches!(&state.messages()[1], ChatUIMessage::Error(e) if e == "connection refused"));
    }
}
