//! Document parsing and markdown rendering.

use pulldown_cmark::{html, Options, Parser};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};

/// A parsed source document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Document body without frontmatter
    pub body: String,
}

/// Errors that can occur when parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Split a document into frontmatter and body.
pub fn parse_document(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, body) = extract_frontmatter(source)?;

    Ok(ParsedDoc {
        frontmatter,
        body: body.to_string(),
    })
}

/// Render markdown to HTML.
///
/// The body is never run through the template engine first.
pub fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(content, options);

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}
