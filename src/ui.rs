use std::io::Stdout;

use crossterm::event::{
    Event,
    EventStream,
    KeyCode,
    KeyEvent,
    KeyEventKind,
    KeyModifiers,
};
use futures::StreamExt;
use humansize::{
    DECIMAL,
    format_size,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::CrosstermBackend,
    style::Stylize,
    symbols::border,
    text::{
        Line,
        Span,
        Text,
    },
    widgets::{
        Block,
        Paragraph,
        Widget,
        Wrap,
    },
};
use tokio::sync::mpsc;

use crate::{
    control::ControlMessage,
    markdown_render::render_markdown_text,
    ui_state::{
        ChatUIMessage,
        ChatUIModification,
        ChatUIState,
        GeneratingState,
    },
};

const INPUT_HEIGHT: u16 = 3;

struct UIState {
    chat: ChatUIState,
    lines: Vec<Line<'static>>,
    scroll_offset: usize,
    visible_height: usize,
    input_text: String,
    // In chars, not bytes.
    input_cursor_position: usize,
    waiting_for_ctrl_c: bool,
}

enum KeyOutcome {
    Redraw,
    Submit(String),
    Quit,
    Ignored,
}

impl UIState {
    fn new() -> Self {
        Self {
            chat: ChatUIState::new(),
            lines: vec![],
            scroll_offset: 0,
            visible_height: 20,
            input_text: String::new(),
            input_cursor_position: 0,
            waiting_for_ctrl_c: false,
        }
    }

    fn apply(&mut self, modification: ChatUIModification) {
        self.chat.apply(modification);
        self.lines = conversation_lines(&self.chat);
        self.scroll_to_bottom();
    }

    fn set_terminal_height(&mut self, terminal_height: u16) {
        // Chat border takes two rows.
        self.visible_height = terminal_height.saturating_sub(INPUT_HEIGHT).saturating_sub(2) as usize;
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.visible_height)
    }

    fn scroll_up(&mut self, by: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(by);
    }

    fn scroll_down(&mut self, by: usize) {
        self.scroll_offset = (self.scroll_offset + by).min(self.max_scroll());
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input_text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.input_text.len())
    }

    fn input_len(&self) -> usize {
        self.input_text.chars().count()
    }

    fn insert_char(&mut self, ch: char) {
        // Prevent newlines to keep input single-line
        if ch != '\n' {
            let at = self.byte_index(self.input_cursor_position);
            self.input_text.insert(at, ch);
            self.input_cursor_position += 1;
        }
    }

    fn delete_char_backward(&mut self) {
        if self.input_cursor_position > 0 {
            self.input_cursor_position -= 1;
            let at = self.byte_index(self.input_cursor_position);
            self.input_text.remove(at);
        }
    }

    fn delete_char_forward(&mut self) {
        if self.input_cursor_position < self.input_len() {
            let at = self.byte_index(self.input_cursor_position);
            self.input_text.remove(at);
        }
    }

    fn move_cursor_left(&mut self) {
        self.input_cursor_position = self.input_cursor_position.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        if self.input_cursor_position < self.input_len() {
            self.input_cursor_position += 1;
        }
    }

    fn submit_input(&mut self) -> Option<String> {
        // One turn at a time; keep the text until the current one finishes.
        if !self.chat.is_idle() || self.input_text.trim().is_empty() {
            return None;
        }
        self.input_cursor_position = 0;
        self.mark_turn_pending();
        Some(std::mem::take(&mut self.input_text))
    }

    // The server confirms with its own state changes; until then the sent turn
    // still counts as running.
    fn mark_turn_pending(&mut self) {
        self.chat.apply(ChatUIModification::SetGeneratingState {
            state: GeneratingState::Generating,
        });
    }

    fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        if let KeyCode::Char(ch) = key.code {
            if self.waiting_for_ctrl_c && ch == 'c' && ctrl {
                return KeyOutcome::Quit;
            }
            if ch == 'x' && ctrl {
                self.waiting_for_ctrl_c = true;
                return KeyOutcome::Redraw;
            }
        }
        self.waiting_for_ctrl_c = false;

        match key.code {
            KeyCode::Char(ch) => match (ch, ctrl, alt) {
                ('p', true, false) => self.scroll_up(1),
                ('n', true, false) => self.scroll_down(1),
                ('v', true, false) => self.scroll_down(self.visible_height),
                ('v', false, true) => self.scroll_up(self.visible_height),
                (_, false, false) => self.insert_char(ch),
                _ => return KeyOutcome::Ignored,
            },
            KeyCode::Enter => {
                return match self.submit_input() {
                    Some(message) => KeyOutcome::Submit(message),
                    None => KeyOutcome::Ignored,
                };
            }
            KeyCode::Backspace => self.delete_char_backward(),
            KeyCode::Delete => self.delete_char_forward(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Home => self.input_cursor_position = 0,
            KeyCode::End => self.input_cursor_position = self.input_len(),
            KeyCode::PageUp => self.scroll_up(self.visible_height),
            KeyCode::PageDown => self.scroll_down(self.visible_height),
            _ => return KeyOutcome::Ignored,
        }
        KeyOutcome::Redraw
    }
}

fn conversation_lines(chat: &ChatUIState) -> Vec<Line<'static>> {
    let mut lines = vec![];
    for message in chat.messages() {
        match message {
            ChatUIMessage::User(u) => {
                lines.push(Line::from(vec!["user: ".cyan().bold(), u.text.clone().into()]));
            }
            ChatUIMessage::Assistant(a) => {
                let markdown_text = render_markdown_text(&a.text);
                let mut markdown_lines = markdown_text.lines.into_iter();
                let mut first = Line::from(vec!["assistant: ".yellow().bold()]);
                if let Some(first_line) = markdown_lines.next() {
                    first.spans.extend(first_line.spans);
                }
                lines.push(first);
                lines.extend(markdown_lines);
            }
            ChatUIMessage::ToolCall(tc) => {
                let status = if tc.result.is_error() {
                    "not found".red().bold()
                } else {
                    "ok".green().bold()
                };
                let result = tc.result.to_json().unwrap_or_default();
                lines.push(Line::from(vec![
                    "tool: ".magenta().bold(),
                    format!("{}({}) ", tc.name, tc.args).into(),
                    status,
                    format!(" {result}").dark_gray(),
                ]));
            }
            ChatUIMessage::Error(text) => {
                lines.push(Line::from(vec!["error: ".red().bold(), Span::from(text.clone()).red()]));
            }
        }
    }
    lines
}

pub async fn ui_loop(
    mut terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
    mut ui_rx: mpsc::UnboundedReceiver<ChatUIModification>,
    control_tx: mpsc::UnboundedSender<ControlMessage>,
    prompt: Option<String>,
) -> anyhow::Result<()> {
    let mut ui_state = UIState::new();
    ui_state.set_terminal_height(terminal.size()?.height);

    // Send initial prompt if provided
    if let Some(prompt) = prompt {
        control_tx.send(ControlMessage::UserMessage(prompt))?;
        ui_state.mark_turn_pending();
    }
    let mut reader = EventStream::new();
    terminal.draw(|frame| {
        frame.render_widget(&ui_state, frame.area());
    })?;
    loop {
        let mut needs_redraw = false;

        tokio::select! {
            chat_modification = ui_rx.recv(), if !ui_rx.is_closed() => {
                let Some(chat_modification) = chat_modification else {
                    continue;
                };
                ui_state.apply(chat_modification);
                needs_redraw = true;
            },
            reader_event = reader.next() => {
                let Some(event) = reader_event else {
                    break;
                };
                match event? {
                    Event::Resize(_, height) => {
                        ui_state.set_terminal_height(height);
                        ui_state.scroll_to_bottom();
                        needs_redraw = true;
                    }
                    Event::Key(key) if key.kind == KeyEventKind::Press => match ui_state.handle_key(key) {
                        KeyOutcome::Quit => break,
                        KeyOutcome::Submit(message) => {
                            control_tx.send(ControlMessage::UserMessage(message))?;
                            needs_redraw = true;
                        }
                        KeyOutcome::Redraw => needs_redraw = true,
                        KeyOutcome::Ignored => {}
                    },
                    _ => {}
                }
            }
        }

        if needs_redraw {
            terminal.draw(|frame| {
                frame.render_widget(&ui_state, frame.area());
            })?;
        }
    }
    tracing::info!("UI loop ended");
    anyhow::Ok(())
}

impl Widget for &UIState {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = Line::from("Chatbot").bold();

        let chat_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: area.height.saturating_sub(INPUT_HEIGHT),
        };
        let input_area = Rect {
            x: area.x,
            y: area.y + chat_area.height,
            width: area.width,
            height: INPUT_HEIGHT.min(area.height),
        };

        let chat_block = Block::bordered().title(title.centered()).border_set(border::THICK);

        if self.lines.is_empty() {
            Paragraph::new("No messages yet".dark_gray())
                .block(chat_block)
                .wrap(Wrap { trim: true })
                .render(chat_area, buf);
        } else {
            let visible_height = chat_area.height.saturating_sub(2) as usize;
            let total_lines = self.lines.len();
            let start_line = self.scroll_offset.min(total_lines.saturating_sub(visible_height));
            let end_line = (start_line + visible_height).min(total_lines);

            Paragraph::new(Text::from(self.lines[start_line..end_line].to_vec()))
                .block(chat_block)
                .wrap(Wrap { trim: false })
                .render(chat_area, buf);

            let mut right_elements = vec![];
            if let Some(stats) = self.chat.turn_stats() {
                right_elements.push(format!(
                    " {:.1}s | {} calls | {}",
                    stats.elapsed.as_secs_f64(),
                    stats.completion_calls,
                    format_size(stats.response_bytes, DECIMAL)
                ));
            }
            if total_lines > visible_height {
                right_elements.push(format!("(lines {}-{} of {})", start_line + 1, end_line, total_lines));
            }
            if !right_elements.is_empty() && chat_area.height > 0 {
                let combined_text = right_elements.join(" | ");
                let width = (combined_text.chars().count() as u16 + 2).min(chat_area.width);
                let indicator_area = Rect {
                    x: chat_area.x + chat_area.width.saturating_sub(width),
                    y: chat_area.y + chat_area.height - 1,
                    width,
                    height: 1,
                };
                Paragraph::new(combined_text.dark_gray()).render(indicator_area, buf);
            }
        }

        let status_text = match self.chat.generating_state() {
            GeneratingState::Idle => None,
            GeneratingState::Generating => Some("Generating...".to_string()),
            GeneratingState::RunningTool { name } => Some(format!("Calling {name}...")),
        };
        if let Some(status_text) = status_text
            && chat_area.height > 0
        {
            let status_area = Rect {
                x: chat_area.x + 1,
                y: chat_area.y + chat_area.height - 1,
                width: (status_text.chars().count() as u16 + 2).min(chat_area.width.saturating_sub(1)),
                height: 1,
            };
            Paragraph::new(status_text.yellow()).render(status_area, buf);
        }

        let input_title = if self.waiting_for_ctrl_c { "Input (Ctrl-C to quit)" } else { "Input" };
        let input_block = Block::bordered().title(input_title).border_set(border::THICK);
        let input_paragraph = if self.input_text.is_empty() {
            Paragraph::new(Line::from(vec!["|".into(), "Ask something...".dark_gray()]))
        } else {
            let mut input_text = self.input_text.clone();
            input_text.insert(self.byte_index(self.input_cursor_position), '|');
            Paragraph::new(input_text)
        };
        input_paragraph
            .block(input_block)
            .wrap(Wrap { trim: true })
            .render(input_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolOutput;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(state: &mut UIState, text: &str) {
        for ch in text.chars() {
            state.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn editing_handles_multibyte_input() {
        let mut state = UIState::new();
        type_text(&mut state, "café");
        state.handle_key(key(KeyCode::Left));
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.input_text, "caé");
        state.handle_key(key(KeyCode::End));
        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.input_text, "ca");
    }

    #[test]
    fn enter_is_ignored_while_a_turn_runs() {
        let mut state = UIState::new();
        type_text(&mut state, "Hello");
        state.apply(ChatUIModification::SetGeneratingState {
            state: GeneratingState::Generating,
        });
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), KeyOutcome::Ignored));
        assert_eq!(state.input_text, "Hello");

        state.apply(ChatUIModification::SetGeneratingState {
            state: GeneratingState::Idle,
        });
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), KeyOutcome::Submit(m) if m == "Hello"));
        assert!(state.input_text.is_empty());
    }

    #[test]
    fn second_enter_waits_for_the_first_turn() {
        let mut state = UIState::new();
        type_text(&mut state, "Weather in Paris?");
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), KeyOutcome::Submit(m) if m == "Weather in Paris?"));
        type_text(&mut state, "And Lyon?");
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), KeyOutcome::Ignored));
        assert_eq!(state.input_text, "And Lyon?");

        state.apply(ChatUIModification::SetGeneratingState {
            state: GeneratingState::Idle,
        });
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), KeyOutcome::Submit(m) if m == "And Lyon?"));
    }

    #[test]
    fn initial_prompt_blocks_enter() {
        let mut state = UIState::new();
        state.mark_turn_pending();
        type_text(&mut state, "Hello");
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), KeyOutcome::Ignored));
        assert_eq!(state.input_text, "Hello");
    }

    #[test]
    fn blank_input_is_not_submitted() {
        let mut state = UIState::new();
        type_text(&mut state, "   ");
        assert!(matches!(state.handle_key(key(KeyCode::Enter)), KeyOutcome::Ignored));
    }

    #[test]
    fn ctrl_x_then_ctrl_c_quits() {
        let mut state = UIState::new();
        assert!(matches!(state.handle_key(ctrl('c')), KeyOutcome::Ignored));
        state.handle_key(ctrl('x'));
        assert!(matches!(state.handle_key(ctrl('c')), KeyOutcome::Quit));
    }

    #[test]
    fn conversation_renders_each_entry() {
        let mut state = UIState::new();
        state.apply(ChatUIModification::AddUserMessage {
            text: "Define serendipity".to_string(),
        });
        state.apply(ChatUIModification::AddToolCall {
            name: "get_definition".to_string(),
            args: r#"{"word":"serendipity"}"#.to_string(),
            result: ToolOutput::Definition {
                definition: "A fortunate discovery.".to_string(),
            },
        });
        state.apply(ChatUIModification::AddAssistantMessage {
            text: "Serendipity is a fortunate discovery.".to_string(),
        });
        let rendered: Vec<String> = state
            .lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect();
        assert_eq!(
            rendered,
            vec![
                "user: Define serendipity".to_string(),
                r#"tool: get_definition({"word":"serendipity"}) ok {"definition":"A fortunate discovery."}"#.to_string(),
                "assistant: Serendipity is a fortunate discovery.".to_string(),
            ]
        );
    }
}
