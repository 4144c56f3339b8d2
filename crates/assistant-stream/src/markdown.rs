//! Markdown rendering collaborator. Any implementation can be injected; the
//! default uses pulldown-cmark.

/// Error from markdown rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("markdown render failed: {0}")]
pub struct MarkdownError(pub String);

/// Converts markdown text to HTML-safe markup.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError>;
}

/// Default renderer using pulldown-cmark. Raw HTML in the source is emitted
/// as escaped text.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulldownMarkdownRenderer;

impl MarkdownRenderer for PulldownMarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError> {
        use pulldown_cmark::{Event, Options, Parser, html};

        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}
