//! Content conversion. Defines the [`Converter`] trait, the Markdown
//! converter, and [`Format`], which picks a converter by file extension.

use crate::fountain::Fountain;
use pulldown_cmark::{html, Options, Parser};
use std::fmt;

/// Converts the body of a content file (everything after the front matter)
/// into an HTML fragment.
pub trait Converter {
    /// Converts `body` into HTML.
    fn convert(&self, body: &str) -> Result<String>;

    /// Whether newline characters are removed from the converted output.
    /// Markdown pages are flattened onto one line; screenplays are not.
    fn strips_newlines(&self) -> bool;

    /// Converts `body` and applies [`Converter::strips_newlines`].
    fn to_html(&self, body: &str) -> Result<String> {
        let html = self.convert(body)?;
        Ok(match self.strips_newlines() {
            true => html.replace('\n', ""),
            false => html,
        })
    }
}

/// The supported content formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// `.md` files.
    Markdown,

    /// `.fountain` screenplay files.
    Fountain,
}

impl Format {
    /// Returns the format for a file extension (without the leading dot),
    /// or `None` if the extension isn't a content extension.
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension {
            "md" => Some(Format::Markdown),
            "fountain" => Some(Format::Fountain),
            _ => None,
        }
    }

    /// The file extension for this format, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Markdown => ".md",
            Format::Fountain => ".fountain",
        }
    }

    /// The converter for this format.
    pub fn converter(self) -> &'static dyn Converter {
        match self {
            Format::Markdown => &Markdown,
            Format::Fountain => &Fountain,
        }
    }
}

/// Converts CommonMark with the GitHub extensions (tables, strikethrough,
/// task lists) and footnotes. pulldown-cmark never reports diagnostics, so
/// there is nothing to silence.
pub struct Markdown;

impl Converter for Markdown {
    fn convert(&self, body: &str) -> Result<String> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut out = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(body, options));
        Ok(out)
    }

    fn strips_newlines(&self) -> bool {
        true
    }
}

/// The result of a fallible conversion.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error converting a body to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned when a screenplay has no content to convert.
    EmptyScript,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::EmptyScript => write!(f, "screenplay body is empty"),
        }
    }
}

impl std::error::Error for Error {}
