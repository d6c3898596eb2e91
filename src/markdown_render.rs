use std::sync::OnceLock;

use pulldown_cmark::{
    CodeBlockKind,
    Event,
    HeadingLevel,
    Options,
    Parser,
    Tag,
    TagEnd,
};
use ratatui::{
    style::{
        Style,
        Stylize,
    },
    text::{
        Line,
        Span,
        Text,
    },
};

use crate::syntax_highlight::SyntaxHighlighter;

/// Renders assistant Markdown into styled terminal lines.
pub(crate) fn render_markdown_text(input: &str) -> Text<'static> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let mut writer = Writer::new();
    for event in Parser::new_ext(input, options) {
        writer.handle_event(event);
    }
    writer.finish()
}

struct Writer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    inline_styles: Vec<Style>,
    list_indices: Vec<Option<u64>>,
    quote_depth: usize,
    link: Option<String>,
    code_block: Option<(Option<String>, String)>,
    needs_blank_line: bool,
}

impl Writer {
    fn new() -> Self {
        Self {
            lines: vec![],
            current: vec![],
            inline_styles: vec![],
            list_indices: vec![],
            quote_depth: 0,
            link: None,
            code_block: None,
            needs_blank_line: false,
        }
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if let Some((_, content)) = &mut self.code_block {
                    content.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => self.current.push(Span::from(code.into_string()).cyan()),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.start_block();
                self.lines.push(Line::from("———"));
                self.needs_blank_line = true;
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.current.is_empty() {
                    self.start_block();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                let hashes = "#".repeat(heading_depth(level));
                self.current.push(Span::from(format!("{hashes} ")).bold());
                self.inline_styles.push(Style::new().bold());
            }
            Tag::BlockQuote { .. } => {
                self.start_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.into_string()),
                    _ => None,
                };
                self.code_block = Some((language, String::new()));
            }
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.start_block();
                } else {
                    self.flush_line();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_indices.len().saturating_sub(1);
                let marker = match self.list_indices.last_mut() {
                    Some(Some(index)) => {
                        let marker = format!("{index}. ");
                        *index += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                self.current.push(Span::from(format!("{}{marker}", "  ".repeat(depth))));
            }
            Tag::Emphasis => self.push_style(Style::new().italic()),
            Tag::Strong => self.push_style(Style::new().bold()),
            Tag::Strikethrough => self.push_style(Style::new().crossed_out()),
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.into_string());
                self.push_style(Style::new().underlined());
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.list_indices.is_empty() {
                    self.flush_line();
                    self.needs_blank_line = true;
                }
            }
            TagEnd::Heading(_) => {
                self.inline_styles.pop();
                self.flush_line();
                self.needs_blank_line = true;
            }
            TagEnd::BlockQuote { .. } => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.needs_blank_line = true;
            }
            TagEnd::CodeBlock => {
                if let Some((language, content)) = self.code_block.take() {
                    let highlighted = highlighter().highlight_code(&content, language.as_deref());
                    self.lines.extend(highlighted);
                }
                self.needs_blank_line = true;
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_indices.pop();
                if self.list_indices.is_empty() {
                    self.needs_blank_line = true;
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline_styles.pop();
            }
            TagEnd::Link => {
                self.inline_styles.pop();
                if let Some(link) = self.link.take() {
                    self.current.push(Span::from(format!(" ({link})")).dark_gray());
                }
            }
            _ => {}
        }
    }

    fn push_style(&mut self, style: Style) {
        let merged = self.current_style().patch(style);
        self.inline_styles.push(merged);
    }

    fn current_style(&self) -> Style {
        self.inline_styles.last().copied().unwrap_or_default()
    }

    fn push_text(&mut self, text: &str) {
        let style = self.current_style();
        let mut parts = text.split('\n');
        if let Some(first) = parts.next() {
            self.current.push(Span::styled(first.to_string(), style));
        }
        for part in parts {
            self.flush_line();
            self.current.push(Span::styled(part.to_string(), style));
        }
    }

    fn start_block(&mut self) {
        self.flush_line();
        if self.needs_blank_line && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.needs_blank_line = false;
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = vec![];
        if self.quote_depth > 0 {
            spans.push(Span::from("> ".repeat(self.quote_depth)).green());
        }
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn finish(mut self) -> Text<'static> {
        self.flush_line();
        Text::from(self.lines)
    }
}

fn highlighter() -> &'static SyntaxHighlighter {
    static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn paragraphs_are_separated_by_a_blank_line() {
        let text = render_markdown_text("It is 18.5°C in Paris.\n\nBring an umbrella.");
        assert_eq!(plain(&text), vec!["It is 18.5°C in Paris.", "", "Bring an umbrella."]);
    }

    #[test]
    fn lists_get_markers() {
        let text = render_markdown_text("Headlines:\n\n- one\n- two\n\n1. first\n2. second\n");
        assert_eq!(
            plain(&text),
            vec!["Headlines:", "", "- one", "- two", "", "1. first", "2. second"]
        );
    }

    #[test]
    fn emphasis_is_styled_inline() {
        let text = render_markdown_text("**serendipity**: a *fortunate* discovery");
        assert_eq!(plain(&text), vec!["serendipity: a fortunate discovery"]);
        let bold = &text.lines[0].spans[0];
        assert_eq!(bold.content, "serendipity");
        assert!(bold.style.add_modifier.contains(ratatui::style::Modifier::BOLD));
    }

    #[test]
    fn code_blocks_keep_their_lines() {
        let text = render_markdown_text("Run:\n\n```sh\ncargo run\ncargo test\n```\n");
        assert_eq!(plain(&text), vec!["Run:", "", "cargo run", "cargo test"]);
    }
}
