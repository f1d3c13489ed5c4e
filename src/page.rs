//! Defines [`Page`], the normalized unit of content, and [`PageKind`].

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// Distinguishes the pages that need special context at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    /// An ordinary content page.
    Content,

    /// The blog index. Receives the pages grouped by year as
    /// `pagesByYear`.
    Index,

    /// A generated per-tag listing. Never parsed from a content file.
    TagListing,
}

impl Default for PageKind {
    fn default() -> Self {
        PageKind::Content
    }
}

impl PageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Content => "content",
            PageKind::Index => "index",
            PageKind::TagListing => "tag-listing",
        }
    }
}

/// One rendered unit of content, parsed from a single content file.
#[derive(Clone, Debug)]
pub struct Page {
    /// Every front-matter field, including the ones lifted into typed fields
    /// below. Templates see all of them.
    pub attributes: serde_yaml::Mapping,

    pub title: String,

    /// The raw `date` field.
    pub date: String,

    /// `date` parsed as a calendar date, if it could be.
    pub published: Option<NaiveDate>,

    pub tags: Vec<String>,

    /// The template name, without extension.
    pub template: String,

    pub draft: bool,

    pub description: Option<String>,

    pub kind: PageKind,

    /// The converted HTML body.
    pub content: String,

    /// The source path relative to the content root, `/`-separated, with
    /// the extension removed (e.g. `posts/a`). Unique across a site.
    pub location: String,

    /// The site path, `/{base_url}/{location}`.
    pub url: String,

    /// The last four characters of `date`.
    pub year: String,

    /// The file the page was parsed from.
    pub source: PathBuf,
}

impl Page {
    /// The output file path relative to the output root.
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.html", self.location))
    }
}
