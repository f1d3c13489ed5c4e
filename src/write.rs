//! Templating and writing of HTML pages. See [`Writer`].

use crate::config::SiteConfig;
use crate::page::{Page, PageKind};
use crate::plan::SitePlan;
use crate::value;
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The template used for every tag listing page.
pub const TAG_TEMPLATE: &str = "tagpage";

/// The directory, under the output root, holding the tag listing pages.
pub const TAGS_DIRECTORY: &str = "tags";

/// The extension of template files.
pub const TEMPLATE_EXTENSION: &str = "html";

/// Loads and caches templates by name from a template directory. Files in the
/// directory whose names start with `_` are partials: their contents are
/// prepended to every template so that `{{define}}` blocks can be shared.
pub struct Templates {
    root: PathBuf,
    partials: String,
    cache: HashMap<String, Template>,
}

impl Templates {
    /// Reads the partials from `root`. Named templates are read on first use.
    pub fn load(root: &Path) -> Result<Templates> {
        let mut partials = Vec::new();
        for entry in fs::read_dir(root).map_err(|err| Error::OpenTemplateFile {
            path: root.to_owned(),
            err,
        })? {
            let path = entry?.path();
            let is_partial = path
                .file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with('_'));
            if is_partial && path.is_file() {
                partials.push(path);
            }
        }
        partials.sort();

        let mut contents = String::new();
        for path in &partials {
            contents.push_str(&read_template(path)?);
        }
        Ok(Templates {
            root: root.to_owned(),
            partials: contents,
            cache: HashMap::new(),
        })
    }

    /// Returns the template `{root}/{name}.html`, parsing it on first use.
    pub fn get(&mut self, name: &str) -> Result<&Template> {
        match self.cache.entry(name.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.root.join(format!("{}.{}", name, TEMPLATE_EXTENSION));
                let mut contents = self.partials.clone();
                contents.push_str(&read_template(&path)?);

                let mut template = Template::default();
                template
                    .parse(&contents)
                    .map_err(|err| Error::ParseTemplate {
                        name: name.to_owned(),
                        err,
                    })?;
                Ok(entry.insert(template))
            }
        }
    }
}

fn read_template(path: &Path) -> Result<String> {
    use std::io::Read;
    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?;
    Ok(contents)
}

/// Counts of the files a [`Writer`] produced.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Written {
    pub pages: usize,
    pub tags: usize,
}

/// Responsible for building template contexts, templating, and writing HTML
/// pages to disk from a [`SitePlan`].
pub struct Writer<'a> {
    /// The site configuration, exposed to templates as `site`.
    pub config: &'a SiteConfig,

    /// The directory in which the HTML files will be written. A page at
    /// location `posts/a` is written to `{output_directory}/posts/a.html` and
    /// the listing for tag `t` to `{output_directory}/tags/t.html`.
    pub output_directory: &'a Path,

    pub templates: Templates,
}

impl Writer<'_> {
    /// Writes one HTML file per page and one per tag.
    pub fn write_site(&mut self, plan: &SitePlan) -> Result<Written> {
        let site = value::site(self.config, plan);
        let pages_by_year = match plan.pages.iter().any(|p| p.kind == PageKind::Index) {
            true => Some(value::pages_by_year(plan)),
            false => None,
        };

        for page in &plan.pages {
            let mut m = value::page_fields(page);
            m.insert("display_date".to_owned(), Value::from(true));
            m.insert("site".to_owned(), site.clone());
            if let (PageKind::Index, Some(by_year)) = (page.kind, &pages_by_year) {
                m.insert("pagesByYear".to_owned(), by_year.clone());
            }
            let html = self.render(&page.template, Value::Object(m))?;
            self.write_page(page, &html)?;
        }

        let tags_directory = self.output_directory.join(TAGS_DIRECTORY);
        if !plan.tags.is_empty() {
            create_dir(&tags_directory)?;
        }
        for tag in &plan.tags {
            let mut m = HashMap::new();
            m.insert("tag".to_owned(), Value::from(tag.as_str()));
            m.insert("title".to_owned(), Value::from(tag.as_str()));
            m.insert("kind".to_owned(), Value::from(PageKind::TagListing.as_str()));
            m.insert("display_date".to_owned(), Value::from(false));
            m.insert(
                "pages".to_owned(),
                Value::Array(plan.tagged(tag).map(Value::from).collect()),
            );
            m.insert("site".to_owned(), site.clone());
            let html = self.render(TAG_TEMPLATE, Value::Object(m))?;
            write_file(&tags_directory.join(format!("{}.html", tag)), &html)?;
        }

        let written = Written {
            pages: plan.pages.len(),
            tags: plan.tags.len(),
        };
        info!(pages = written.pages, tags = written.tags, "wrote html");
        Ok(written)
    }

    fn render(&mut self, template_name: &str, value: Value) -> Result<String> {
        let context = Context::from(value).map_err(|err| Error::Template {
            name: template_name.to_owned(),
            err,
        })?;
        self.templates
            .get(template_name)?
            .render(&context)
            .map_err(|err| Error::Template {
                name: template_name.to_owned(),
                err,
            })
    }

    /// Writes a rendered page, creating its directory if the walk didn't.
    fn write_page(&self, page: &Page, html: &str) -> Result<()> {
        let path = self.output_directory.join(page.output_path());
        if let Some(dir) = path.parent() {
            create_dir(dir)?;
        }
        debug!(path = %path.display(), "writing page");
        write_file(&path, html)
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| Error::Write {
        path: dir.to_owned(),
        err,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be opened or read.
    OpenTemplateFile { path: PathBuf, err: io::Error },

    /// Returned when a template file can't be parsed.
    ParseTemplate { name: String, err: String },

    /// An error during templating.
    Template { name: String, err: String },

    /// An error writing the output files.
    Write { path: PathBuf, err: io::Error },

    /// Returned for other I/O errors.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { name, err } => {
                write!(f, "Parsing template `{}`: {}", name, err)
            }
            Error::Template { name, err } => {
                write!(f, "Executing template `{}`: {}", name, err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}
