pub const SYSTEM_PROMPT: &str = "Use tools to answer questions about weather, news, and word definitions. Always respond \
                                 concisely from tool output.";

/// Stands in for an assistant message that came back without text.
pub const NO_RESPONSE: &str = "[No response]";
