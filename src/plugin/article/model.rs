//! Article model and mail-style message parsing.
//!
//! An article file is a block of `key: value` header lines, a blank line,
//! then the markdown body:
//!
//! ```text
//! title: Hello World
//! date: 2024-01-01
//! tags: rust, web
//!
//! Body in *markdown*.
//! ```

use crate::utils::slug::slugify;
use pulldown_cmark::{Options, Parser, html};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw body bytes rendered into the preview.
pub const PREVIEW_BYTES: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArticleError {
    #[error("malformed header line `{0}`")]
    MalformedHeader(String),

    #[error("header block is not terminated by a blank line")]
    MissingHeaderBlock,

    #[error("title is missing or has no characters usable in a slug")]
    MissingTitle,
}

/// One rendered markdown article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: String,
    pub permalink: String,
    pub title: String,
    pub date: String,
    pub content: String,
    pub preview: String,
    pub template: String,
    pub pin: bool,
    pub published: bool,
    pub tags: Vec<String>,
    pub authors: Vec<String>,
}

impl Article {
    /// Parse an article found in the content directory `relative_dir`
    /// (forward-slash form, empty for the content root).
    pub fn parse(source: &str, relative_dir: &str) -> Result<Self, ArticleError> {
        let message = Message::parse(source)?;

        let title = message.header("title").to_owned();
        let id = slugify(&title);
        if id.is_empty() {
            return Err(ArticleError::MissingTitle);
        }
        let permalink = if relative_dir.is_empty() {
            format!("{id}.html")
        } else {
            format!("{relative_dir}/{id}.html")
        };

        Ok(Self {
            permalink,
            title,
            date: message.header("date").to_owned(),
            content: render_markdown(message.body),
            preview: render_markdown(&preview_source(message.body)),
            template: message.header("template").to_owned(),
            pin: message.header("pin") == "true",
            published: message.header("active") != "false",
            tags: split_list(message.header("tags")),
            authors: split_list(message.header("authors")),
            id,
        })
    }

    /// Output file name, `<id>.html`.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.id)
    }
}

/// Render markdown to HTML.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// First [`PREVIEW_BYTES`] raw bytes of the body. The cut ignores markdown
/// structure; a split character is replaced, not dropped.
fn preview_source(body: &str) -> String {
    let end = body.len().min(PREVIEW_BYTES);
    String::from_utf8_lossy(&body.as_bytes()[..end]).into_owned()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

// ============================================================================
// Message
// ============================================================================

/// Header fields and body of a mail-style message.
struct Message<'a> {
    headers: Vec<(String, String)>,
    body: &'a str,
}

impl<'a> Message<'a> {
    fn parse(source: &'a str) -> Result<Self, ArticleError> {
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut rest = source;

        loop {
            let Some((raw, next)) = split_line(rest) else {
                // headers running into EOF make a body-less message
                if headers.is_empty() {
                    return Err(ArticleError::MissingHeaderBlock);
                }
                break;
            };
            rest = next;
            let line = raw.trim_end_matches('\r');

            if line.is_empty() {
                break;
            }
            if line.starts_with([' ', '\t']) {
                // continuation of the previous field
                let Some((_, value)) = headers.last_mut() else {
                    return Err(ArticleError::MalformedHeader(line.to_owned()));
                };
                value.push(' ');
                value.push_str(line.trim());
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(ArticleError::MalformedHeader(line.to_owned()));
            };
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(ArticleError::MalformedHeader(line.to_owned()));
            }
            headers.push((key.to_ascii_lowercase(), value.trim().to_owned()));
        }

        Ok(Self {
            headers,
            body: rest,
        })
    }

    /// First value of `name` (case-insensitive), or `""`.
    fn header(&self, name: &str) -> &str {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map_or("", |(_, value)| value.as_str())
    }
}

/// Split off one line; `None` once the input is exhausted.
fn split_line(s: &str) -> Option<(&str, &str)> {
    if s.is_empty() {
        return None;
    }
    Some(s.split_once('\n').unwrap_or((s, "")))
}
