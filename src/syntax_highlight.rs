use ratatui::{
    style::{
        Color,
        Modifier,
        Style,
    },
    text::{
        Line,
        Span,
    },
};
use syntect::{
    easy::HighlightLines,
    highlighting::{
        self,
        FontStyle,
        ThemeSet,
    },
    parsing::SyntaxSet,
    util::LinesWithEndings,
};
use tracing::debug;

const THEME: &str = "base16-ocean.dark";

pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();

        Self { syntax_set, theme_set }
    }

    /// Highlights `code` as `language`, falling back to plain lines when the
    /// language or theme is unknown or highlighting fails.
    pub fn highlight_code(&self, code: &str, language: Option<&str>) -> Vec<Line<'static>> {
        debug!("highlight_code called with language: {:?}, code length: {}", language, code.len());

        let Some(theme) = self.theme_set.themes.get(THEME) else {
            return plain_lines(code);
        };

        // Find syntax by language token (tries extension first, then case-insensitive name)
        let syntax = language
            .and_then(|lang| self.syntax_set.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        debug!("Chosen syntax: {}", syntax.name);

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = vec![];
        for line in LinesWithEndings::from(code) {
            let Ok(ranges) = highlighter.highlight_line(line, &self.syntax_set) else {
                return plain_lines(code);
            };
            let spans: Vec<Span<'static>> = ranges
                .into_iter()
                .map(|(style, text)| {
                    let text = text.trim_end_matches(['\n', '\r']);
                    Span::styled(text.to_string(), translate_style(style))
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

// Background is left to the terminal.
fn translate_style(style: highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut translated = Style::new().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        translated = translated.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        translated = translated.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        translated = translated.add_modifier(Modifier::UNDERLINED);
    }
    translated
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.lines().map(|line| Line::from(line.to_string())).collect()
}
