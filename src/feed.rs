//! Support for creating an RSS 2.0 feed from the published pages.

use crate::config::SiteConfig;
use crate::date;
use crate::page::Page;
use crate::plan::SENTINEL_YEAR;
use rss::extension::atom::{AtomExtensionBuilder, Link};
use rss::validation::{Validate, ValidationError};
use rss::{Channel, ChannelBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};
use std::fmt;
use std::io::Write;

/// The feed's file name, relative to the output root.
pub const FEED_FILE_NAME: &str = "rss.xml";

/// Creates a feed from the site configuration and a list of [`Page`]s and
/// writes the result to a [`std::io::Write`]. Items appear in the order of
/// `pages`.
pub fn write_feed<W: Write>(config: &SiteConfig, pages: &[Page], w: W) -> Result<()> {
    let channel = feed(config, pages);
    channel.validate()?;
    channel.write_to(w)?.flush()?;
    Ok(())
}

/// Builds the channel. Channel metadata comes from `config`; there is one
/// item per page. Pages in [`SENTINEL_YEAR`] and pages whose date couldn't be
/// parsed get no `pubDate`.
pub fn feed(config: &SiteConfig, pages: &[Page]) -> Channel {
    let mut self_link = Link::default();
    self_link.set_href(config.absolute_url(FEED_FILE_NAME));
    self_link.set_rel("self");
    self_link.set_mime_type(Some("application/rss+xml".to_owned()));

    ChannelBuilder::default()
        .title(config.title.clone())
        .link(config.url.to_string())
        .description(config.description.clone())
        .language(Some("en".to_owned()))
        .image(config.image.as_ref().map(|image| {
            ImageBuilder::default()
                .url(config.absolute_url(image))
                .title(config.title.clone())
                .link(config.url.to_string())
                .build()
        }))
        .atom_ext(Some(
            AtomExtensionBuilder::default()
                .links(vec![self_link])
                .build(),
        ))
        .items(pages.iter().map(|page| feed_item(config, page)).collect::<Vec<Item>>())
        .build()
}

fn feed_item(config: &SiteConfig, page: &Page) -> Item {
    let link = config.absolute_url(&page.location);
    ItemBuilder::default()
        .title(Some(page.title.clone()))
        .link(Some(link.clone()))
        .guid(Some(
            GuidBuilder::default().permalink(true).value(link).build(),
        ))
        .description(Some(page.description.clone().unwrap_or_default()))
        .content(Some(page.content.clone()))
        .author(Some(author(config)))
        .pub_date(match page.year.as_str() {
            SENTINEL_YEAR => None,
            _ => page.published.and_then(date::to_rfc2822),
        })
        .build()
}

/// RSS wants `email (Name)`.
fn author(config: &SiteConfig) -> String {
    format!("{} ({})", config.email, config.author)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, RSS, and
/// validation issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when the feed can't be serialized.
    Rss(rss::Error),

    /// Returned when the feed isn't valid RSS, e.g. for a malformed image
    /// URL.
    Validation(ValidationError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Rss(err) => err.fmt(f),
            Error::Validation(err) => write!(f, "invalid feed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Rss(err) => Some(err),
            Error::Validation(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<rss::Error> for Error {
    fn from(err: rss::Error) -> Error {
        Error::Rss(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Error {
        Error::Validation(err)
    }
}
