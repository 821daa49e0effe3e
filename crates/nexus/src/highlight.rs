use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style as SynStyle, Theme as SynTheme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::config::Theme;

/// Markdown syntax highlighting for the editor pane, themed to match the
/// UI theme.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: SynTheme,
}

fn syntect_theme_name(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "InspiredGitHub",
        Theme::Dark => "base16-ocean.dark",
    }
}

impl Highlighter {
    pub fn new(theme: Theme) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();

        let name = syntect_theme_name(theme);
        let syn_theme = theme_set
            .themes
            .get(name)
            .or_else(|| theme_set.themes.values().next())
            .cloned()
            .unwrap_or_default();

        Self {
            syntax_set,
            theme_set,
            theme: syn_theme,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if let Some(t) = self.theme_set.themes.get(syntect_theme_name(theme)) {
            self.theme = t.clone();
        }
    }

    pub fn highlight_markdown(&self, lines: &[String]) -> Vec<Line<'static>> {
        let syntax = self
            .syntax_set
            .find_syntax_by_name("Markdown")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        lines
            .iter()
            .map(|line| {
                let line_no_nl = line.trim_end_matches('\n');
                let regions = highlighter
                    .highlight_line(line_no_nl, &self.syntax_set)
                    .unwrap_or_else(|_| vec![(SynStyle::default(), line_no_nl)]);

                let spans: Vec<Span> = regions
                    .into_iter()
                    .map(|(style, text)| {
                        Span::styled(text.to_string(), syn_style_to_ratatui(style))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn syn_style_to_ratatui(style: SynStyle) -> Style {
    let fg = style.foreground;
    let bg = style.background;
    let mut s = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if !(bg.r == 0 && bg.g == 0 && bg.b == 0) {
        s = s.bg(Color::Rgb(bg.r, bg.g, bg.b));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlights_every_line() {
        let highlighter = Highlighter::new(Theme::Dark);
        let lines = vec!["# Title\n".to_string(), "plain text\n".to_string()];
        let rendered = highlighter.highlight_markdown(&lines);
        assert_eq!(rendered.len(), 2);
    }

    #[test]
    fn test_theme_switch_does_not_panic() {
        let mut highlighter = Highlighter::new(Theme::Light);
        highlighter.set_theme(Theme::Dark);
        let rendered = highlighter.highlight_markdown(&["**bold**".to_string()]);
        assert_eq!(rendered.len(), 1);
    }
}
