//! Defines [`PageCollection`]: every page parsed during traversal together
//! with the [`TagIndex`] accumulated along the way.

use crate::config::SiteConfig;
use crate::page::Page;
use crate::parser::{self, Parser};
use crate::tag::TagIndex;
use crate::walk::{self, walk};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// The parsed pages of a site, in traversal order, and their tags. Locations
/// are unique.
#[derive(Debug, Default)]
pub struct PageCollection {
    pages: Vec<Page>,
    tags: TagIndex,
    sources: HashMap<String, PathBuf>,
}

impl PageCollection {
    pub fn new() -> PageCollection {
        PageCollection::default()
    }

    /// Walks `config.pages_loc`, mirroring its directories under
    /// `output_root`, and parses every content file into the collection.
    /// Fails on the first file that can't be parsed.
    pub fn load(config: &SiteConfig, output_root: &Path) -> Result<PageCollection> {
        let files = walk(&config.pages_loc, |name| config.is_excluded(name), output_root)?;
        let parser = Parser::new(config);
        let mut collection = PageCollection::new();
        for file in &files {
            let page = parser.parse_file(file, &mut collection.tags)?;
            collection.insert(page)?;
        }
        info!(
            pages = collection.pages.len(),
            tags = collection.tags.len(),
            "parsed content"
        );
        Ok(collection)
    }

    /// Adds `page`. Fails if another page already has its location.
    pub fn insert(&mut self, page: Page) -> Result<()> {
        if let Some(first) = self.sources.get(&page.location) {
            return Err(Error::DuplicateLocation {
                location: page.location,
                first: first.clone(),
                second: page.source,
            });
        }
        self.sources.insert(page.location.clone(), page.source.clone());
        self.pages.push(page);
        Ok(())
    }

    /// Consumes the collection. Only call this once traversal is complete:
    /// the tag index isn't final before then.
    pub fn into_parts(self) -> (Vec<Page>, TagIndex) {
        (self.pages, self.tags)
    }
}

/// The result of a fallible collection operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error gathering pages.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors walking the content tree.
    Walk(walk::Error),

    /// Returned for errors parsing a content file.
    Parse(parser::Error),

    /// Returned when two content files map to the same location, e.g.
    /// `a.md` and `a.fountain`.
    DuplicateLocation {
        location: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Walk(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::DuplicateLocation {
                location,
                first,
                second,
            } => write!(
                f,
                "'{}' and '{}' both map to location `{}`",
                first.display(),
                second.display(),
                location
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Walk(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::DuplicateLocation { .. } => None,
        }
    }
}

impl From<walk::Error> for Error {
    fn from(err: walk::Error) -> Error {
        Error::Walk(err)
    }
}

impl From<parser::Error> for Error {
    fn from(err: parser::Error) -> Error {
        Error::Parse(err)
    }
}
