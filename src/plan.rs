//! Post-processing over the complete set of parsed pages: draft filtering,
//! ordering, year grouping, and tag enumeration. See [`plan`].

use crate::page::Page;
use crate::tag::TagIndex;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// The year given to pages that have no real date (e.g. `01-01-0000`). It
/// never appears in [`SitePlan::years`].
pub const SENTINEL_YEAR: &str = "0000";

/// The pages sharing one year.
#[derive(Clone, Debug, PartialEq)]
pub struct YearGroup {
    pub year: String,

    /// Indices into [`SitePlan::pages`], in page order.
    pub pages: Vec<usize>,
}

/// The final shape of a site, ready to render.
#[derive(Debug)]
pub struct SitePlan {
    /// The published pages, newest first.
    pub pages: Vec<Page>,

    /// Year groups, newest year first, without [`SENTINEL_YEAR`].
    pub years: Vec<YearGroup>,

    /// The distinct tags, lexicographically.
    pub tags: Vec<String>,

    /// How many draft pages were dropped.
    pub drafts: usize,
}

impl SitePlan {
    /// The pages of a year group.
    pub fn group_pages<'a>(&'a self, group: &'a YearGroup) -> impl Iterator<Item = &'a Page> + 'a {
        group.pages.iter().map(move |&i| &self.pages[i])
    }

    /// The published pages carrying `tag`, in page order.
    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Page> + 'a {
        self.pages
            .iter()
            .filter(move |page| page.tags.iter().any(|t| t == tag))
    }
}

/// Plans the site from the output of traversal. `tags` must be the complete
/// index, so this runs only after every file has been parsed.
pub fn plan(pages: Vec<Page>, tags: &TagIndex) -> SitePlan {
    let total = pages.len();
    let mut pages = drop_drafts(pages);
    let drafts = total - pages.len();
    sort_newest_first(&mut pages);
    let years = group_by_year(&pages);
    info!(pages = pages.len(), drafts, years = years.len(), "planned site");

    SitePlan {
        pages,
        years,
        tags: tags.sorted(),
        drafts,
    }
}

fn drop_drafts(pages: Vec<Page>) -> Vec<Page> {
    pages
        .into_iter()
        .filter(|page| {
            if page.draft {
                debug!(location = %page.location, "skipping draft");
            }
            !page.draft
        })
        .collect()
}

/// Sorts by parsed date, newest first. The sort is stable, so pages with the
/// same date keep their traversal order, and pages whose date couldn't be
/// parsed come last.
fn sort_newest_first(pages: &mut [Page]) {
    pages.sort_by(|a, b| b.published.cmp(&a.published));
}

fn group_by_year(pages: &[Page]) -> Vec<YearGroup> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, page) in pages.iter().enumerate() {
        groups.entry(page.year.as_str()).or_default().push(i);
    }
    groups.remove(SENTINEL_YEAR);

    groups
        .into_iter()
        .rev()
        .map(|(year, pages)| YearGroup {
            year: year.to_owned(),
            pages,
        })
        .collect()
}
