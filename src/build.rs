//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: walking and parsing the content
//! ([`crate::collection`]), planning ([`crate::plan`]), rendering pages
//! ([`crate::write`]), and generating the RSS feed ([`crate::feed`]).

use crate::collection::{Error as CollectError, PageCollection};
use crate::config::SiteConfig;
use crate::feed::{write_feed, Error as FeedError, FEED_FILE_NAME};
use crate::plan::plan;
use crate::write::{Error as WriteError, Templates, Writer};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

/// What a build produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    /// Content files parsed, drafts included.
    pub parsed: usize,

    /// Draft pages that were left out.
    pub drafts: usize,

    /// HTML pages written for content.
    pub pages: usize,

    /// Tag listing pages written.
    pub tags: usize,

    /// The feed file.
    pub feed: PathBuf,
}

/// Builds the site described by `config` into `config.output_loc`. Each step
/// runs only after the previous one has finished, so the tag index is
/// complete before anything is rendered. The first error aborts the build;
/// files already written are left in place.
pub fn build_site(config: &SiteConfig) -> Result<Summary> {
    let output_directory = &config.output_loc;

    // collect all pages
    let collection = PageCollection::load(config, output_directory)?;
    let (pages, tags) = collection.into_parts();
    let parsed = pages.len();

    let plan = plan(pages, &tags);

    // write the content and tag pages
    let mut writer = Writer {
        config,
        output_directory,
        templates: Templates::load(&config.templates_loc)?,
    };
    let written = writer.write_site(&plan)?;

    // create the feed
    let feed = output_directory.join(FEED_FILE_NAME);
    let file = File::create(&feed).map_err(|err| Error::Feed(FeedError::Io(err)))?;
    write_feed(config, &plan.pages, BufWriter::new(file))?;
    info!(path = %feed.display(), items = plan.pages.len(), "wrote feed");

    Ok(Summary {
        parsed,
        drafts: plan.drafts,
        pages: written.pages,
        tags: written.tags,
        feed,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during traversal and
/// parsing, writing pages, or writing the feed.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors walking or parsing the content.
    Collect(CollectError),

    /// Returned for errors templating or writing pages.
    Write(WriteError),

    /// Returned for errors writing the feed.
    Feed(FeedError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Collect(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Feed(err) => write!(f, "Writing feed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Collect(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Feed(err) => Some(err),
        }
    }
}

impl From<CollectError> for Error {
    /// Converts [`CollectError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: CollectError) -> Error {
        Error::Collect(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}
