#[derive(Debug, Clone)]
pub enum ControlMessage {
    UserMessage(String),
}
