use colored::{ColoredString, Colorize};
use scraper::{ElementRef, Html};

use crate::data_models::{OutputOptions, SearchResultItem};

pub const SNIPPET_MAX_CHARS: usize = 100;
pub const UNAVAILABLE: &str = "unavailable";

/// Turns a result into the one-line form printed for every hit:
///
/// ```text
/// [URL] [https://example.com/login] [200] [Login page] [Please sign in to ...]
/// ```
///
/// Status, title and snippet appear only when enabled in [`OutputOptions`].
/// A field that was asked for but could not be obtained is printed as
/// `[unavailable]`.
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    options: OutputOptions,
}

impl ResultFormatter {
    pub fn new(options: OutputOptions) -> ResultFormatter {
        ResultFormatter { options }
    }

    pub fn options(&self) -> &OutputOptions {
        &self.options
    }

    /// Plain text, used for the destination file.
    pub fn format(&self, item: &SearchResultItem) -> String {
        self.render(item, false)
    }

    /// Same line with ANSI colours for the terminal.
    pub fn format_colored(&self, item: &SearchResultItem) -> String {
        self.render(item, true)
    }

    fn render(&self, item: &SearchResultItem, color: bool) -> String {
        let paint = |text: String, style: fn(&str) -> ColoredString| {
            if color {
                style(&text).to_string()
            } else {
                text
            }
        };

        let mut pieces = vec![paint(bracket(&item.url), |s| s.green())];

        if self.options.show_http_code {
            let piece = match item.http_status {
                Some(code) => paint(bracket(&code.to_string()), status_style(code)),
                None => paint(bracket(UNAVAILABLE), |s| s.white()),
            };
            pieces.push(piece);
        }
        if self.options.show_title {
            pieces.push(paint(bracket(&item.title), |s| s.magenta()));
        }
        if self.options.show_body_snippet {
            let snippet = match &item.snippet_body {
                Some(body) => body_snippet(body),
                None => UNAVAILABLE.to_string(),
            };
            pieces.push(paint(bracket(&snippet), |s| s.cyan()));
        }

        format!("{} {}", paint("[URL]".to_string(), |s| s.blue()), pieces.join(" "))
    }
}

fn bracket(text: &str) -> String {
    format!("[{text}]")
}

fn status_style(code: u16) -> fn(&str) -> ColoredString {
    match code {
        200..=299 => |s| s.green(),
        300..=399 => |s| s.yellow(),
        400..=599 => |s| s.red(),
        _ => |s| s.white(),
    }
}

/// Visible text of the page body, whitespace collapsed, capped at
/// [`SNIPPET_MAX_CHARS`] characters.
pub fn body_snippet(html: &str) -> String {
    let document = Html::parse_document(html);
    let text = document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .map(visible_text)
        .unwrap_or_default();

    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(SNIPPET_MAX_CHARS)
        .collect()
}

fn visible_text(body: ElementRef) -> String {
    let mut out = String::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript" | "template"));
        if !hidden {
            out.push_str(text);
        }
    }
    out
}
