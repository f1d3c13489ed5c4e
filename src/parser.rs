//! Defines the [`Parser`] and its [`Error`] type: the logic that turns a
//! content file into a [`Page`]. Each file must be structured as follows:
//!
//! 1. Initial front matter fence (`---`)
//! 2. YAML front matter with fields `title`, `date`, `template`, and
//!    optionally `tags`, `draft`, `description`, `kind`, plus anything else
//!    the templates want
//! 3. Terminal front matter fence (`---`)
//! 4. Body, in the format selected by the file extension
//!
//! For example:
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 04-16-2021
//! tags: [greet]
//! template: post
//! ---
//! # Hello
//!
//! World
//! ```

use crate::config::SiteConfig;
use crate::date;
use crate::markdown::{self, Format};
use crate::page::{Page, PageKind};
use crate::tag::{self, TagIndex};
use crate::walk::SourceFile;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// The front matter fields the pipeline reads. Everything else is kept only
/// in [`Page::attributes`].
#[derive(Deserialize)]
struct Frontmatter {
    title: Option<String>,

    /// Kept as a YAML value so that e.g. `date: 2023` is accepted.
    date: Option<serde_yaml::Value>,

    #[serde(default)]
    tags: Vec<String>,

    template: Option<String>,

    #[serde(default)]
    draft: bool,

    description: Option<String>,

    #[serde(default)]
    kind: PageKind,
}

/// Parses [`Page`] objects from content files.
pub struct Parser<'a> {
    config: &'a SiteConfig,
}

impl<'a> Parser<'a> {
    pub fn new(config: &'a SiteConfig) -> Parser<'a> {
        Parser { config }
    }

    /// Reads and parses a file found by [`crate::walk::walk`]. Errors are
    /// annotated with the file path.
    pub fn parse_file(&self, file: &SourceFile, tags: &mut TagIndex) -> Result<Page> {
        match self._parse_file(file, tags) {
            Ok(page) => Ok(page),
            Err(e) => Err(Error::Annotated(
                format!("parsing `{}`", file.path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_file(&self, file: &SourceFile, tags: &mut TagIndex) -> Result<Page> {
        let input = std::fs::read_to_string(&file.path)?;
        let mut page = self.parse(&input, file.format, &file.parent, &file.file_name, tags)?;
        page.source = file.path.clone();
        Ok(page)
    }

    /// Parses the contents of a content file. `parent` is the directory
    /// containing the file relative to the content root and `file_name`
    /// includes the extension. The tags of a non-draft page are registered
    /// in `tags`.
    pub fn parse(
        &self,
        input: &str,
        format: Format,
        parent: &Path,
        file_name: &str,
        tags: &mut TagIndex,
    ) -> Result<Page> {
        let (yaml, body) = split_frontmatter(input)?;
        let attributes: serde_yaml::Mapping = match yaml.trim().is_empty() {
            true => serde_yaml::Mapping::new(),
            false => serde_yaml::from_str(yaml)?,
        };
        let frontmatter: Frontmatter =
            serde_yaml::from_value(serde_yaml::Value::Mapping(attributes.clone()))?;

        let title = frontmatter.title.ok_or(Error::MissingField("title"))?;
        let template = frontmatter.template.ok_or(Error::MissingField("template"))?;
        let date = match frontmatter.date {
            Some(value) => scalar_string(value).ok_or(Error::InvalidDate)?,
            None => return Err(Error::MissingField("date")),
        };
        let year = date::year(&date)
            .ok_or_else(|| Error::InvalidYear(date.clone()))?
            .to_owned();
        if frontmatter.kind == PageKind::TagListing {
            return Err(Error::InvalidKind);
        }
        if let Some(bad) = frontmatter.tags.iter().find(|t| !tag::is_valid(t)) {
            return Err(Error::InvalidTag(bad.clone()));
        }

        if !frontmatter.draft {
            for tag in &frontmatter.tags {
                tags.register(tag);
            }
        }

        let content = format.converter().to_html(body)?;
        let location = location(parent, file_name, format)?;
        debug!(%location, draft = frontmatter.draft, "parsed page");

        Ok(Page {
            url: self.config.page_url(&location),
            published: date::parse(&date),
            attributes,
            title,
            date,
            tags: frontmatter.tags,
            template,
            draft: frontmatter.draft,
            description: frontmatter.description,
            kind: frontmatter.kind,
            content,
            location,
            year,
            source: parent.join(file_name),
        })
    }
}

/// Splits `input` into its YAML front matter and its body.
fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    let input = input.trim_start_matches('\u{feff}');
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    let yaml_start = match input.find('\n') {
        Some(i) => i + 1,
        None => return Err(Error::FrontmatterMissingEndFence),
    };

    // the closing fence has to start a line
    let mut offset = yaml_start;
    loop {
        let line_end = input[offset..]
            .find('\n')
            .map_or(input.len(), |i| offset + i + 1);
        if input[offset..line_end].trim_end() == FENCE {
            return Ok((&input[yaml_start..offset], &input[line_end..]));
        }
        if line_end >= input.len() {
            return Err(Error::FrontmatterMissingEndFence);
        }
        offset = line_end;
    }
}

/// Joins `parent` and `file_name`, normalizes separators to `/`, and removes
/// the format's extension.
fn location(parent: &Path, file_name: &str, format: Format) -> Result<String> {
    let joined = parent.join(file_name);
    let joined = joined
        .to_str()
        .ok_or_else(|| Error::InvalidFileName(joined.display().to_string()))?
        .replace('\\', "/");
    Ok(joined
        .strip_suffix(format.extension())
        .unwrap_or(&joined)
        .to_owned())
}

fn scalar_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Represents the result of a [`Page`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Page`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a content file is missing its starting front matter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a content file is missing its terminal front matter
    /// fence.
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the front matter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a required front matter field is absent.
    MissingField(&'static str),

    /// Returned when `date` isn't a string or a number.
    InvalidDate,

    /// Returned when `date` doesn't end in a four-digit year.
    InvalidYear(String),

    /// Returned when the front matter claims a kind reserved for generated
    /// pages.
    InvalidKind,

    /// Returned when a tag can't be used as a file name.
    InvalidTag(String),

    /// Returned when the body couldn't be converted.
    Convert(markdown::Error),

    /// Returned when a path isn't valid UTF-8.
    InvalidFileName(String),

    /// Returned for I/O errors reading the file.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "content must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::MissingField(field) => {
                write!(f, "missing required front matter field `{}`", field)
            }
            Error::InvalidDate => write!(f, "`date` must be a string"),
            Error::InvalidYear(date) => {
                write!(f, "`date` must end in a four-digit year, got {:?}", date)
            }
            Error::InvalidKind => {
                write!(f, "`kind` must be `content` or `index`")
            }
            Error::InvalidTag(tag) => {
                write!(f, "tag {:?} can't be used as a file name", tag)
            }
            Error::Convert(err) => err.fmt(f),
            Error::InvalidFileName(path) => write!(f, "invalid file name: {:?}", path),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeserializeYaml(err) => Some(err),
            Error::Convert(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<markdown::Error> for Error {
    fn from(err: markdown::Error) -> Error {
        Error::Convert(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn config() -> SiteConfig {
        serde_yaml::from_str(
            "title: Notebook\nurl: https://example.com\nbaseUrl: blog\nauthor: Jo\nemail: jo@example.com\n",
        )
        .unwrap()
    }

    fn parse(input: &str, format: Format, parent: &str, file_name: &str) -> (Result<Page>, TagIndex) {
        let config = config();
        let mut tags = TagIndex::new();
        let page = Parser::new(&config).parse(input, format, Path::new(parent), file_name, &mut tags);
        (page, tags)
    }

    #[test]
    fn test_parse_markdown() -> Result<()> {
        let input = "---\ntitle: A\ndate: 01-01-2023\ntags: [x, y]\ntemplate: post\nmood: sunny\n---\n# Hi\n\nThere\n";
        let (page, tags) = parse(input, Format::Markdown, "posts", "a.md");
        let page = page?;

        assert_eq!(page.title, "A");
        assert_eq!(page.location, "posts/a");
        assert_eq!(page.url, "/blog/posts/a");
        assert_eq!(page.year, "2023");
        assert_eq!(page.template, "post");
        assert_eq!(page.kind, PageKind::Content);
        assert_eq!(page.content, "<h1>Hi</h1><p>There</p>");
        assert!(!page.content.contains('\n'));
        assert!(!page.draft);
        assert_eq!(page.published, chrono::NaiveDate::from_ymd_opt(2023, 1, 1));
        assert!(tags.contains("x") && tags.contains("y"));
        assert_eq!(
            page.attributes.get(&serde_yaml::Value::from("mood")),
            Some(&serde_yaml::Value::from("sunny"))
        );
        Ok(())
    }

    #[test]
    fn test_parse_fountain() -> Result<()> {
        let input = "---\ntitle: Kettle\ndate: 03-02-2021\ntemplate: script\n---\nINT. KITCHEN - NIGHT\n\nThe kettle whistles.\n";
        let (page, _) = parse(input, Format::Fountain, "scripts", "kettle.fountain");
        let page = page?;

        assert_eq!(page.location, "scripts/kettle");
        assert_eq!(page.year, "2021");
        assert_eq!(
            page.content,
            "<h3>INT. KITCHEN - NIGHT</h3>\n<p>The kettle whistles.</p>"
        );
        Ok(())
    }

    #[test]
    fn test_location_normalizes_separators() -> Result<()> {
        assert_eq!(location(Path::new(""), "about.md", Format::Markdown)?, "about");
        assert_eq!(
            location(Path::new("a\\b"), "c.fountain", Format::Fountain)?,
            "a/b/c"
        );
        assert_eq!(
            location(Path::new("notes"), "v1.md.md", Format::Markdown)?,
            "notes/v1.md"
        );
        Ok(())
    }

    #[test]
    fn test_year_is_last_four_characters() -> Result<()> {
        for (date, year) in &[("12/25/1999", "1999"), ("Dec 25, 2004", "2004"), ("2010", "2010")] {
            let input = format!("---\ntitle: T\ndate: {}\ntemplate: post\n---\n", date);
            let (page, _) = parse(&input, Format::Markdown, "", "t.md");
            assert_eq!(&page?.year, year);
        }
        Ok(())
    }

    #[test]
    fn test_draft_tags_not_registered() -> Result<()> {
        let input = "---\ntitle: A\ndate: 01-01-2023\ntags: [secret]\ntemplate: post\ndraft: true\n---\nbody\n";
        let (page, tags) = parse(input, Format::Markdown, "", "a.md");
        assert!(page?.draft);
        assert!(tags.is_empty());
        Ok(())
    }

    #[test]
    fn test_index_kind() -> Result<()> {
        let input = "---\ntitle: Blog\ndate: 01-01-0000\ntemplate: blog\nkind: index\n---\n";
        let (page, _) = parse(input, Format::Markdown, "", "blog.md");
        assert_eq!(page?.kind, PageKind::Index);

        let input = "---\ntitle: Blog\ndate: 01-01-0000\ntemplate: blog\nkind: tag-listing\n---\n";
        let (page, _) = parse(input, Format::Markdown, "", "blog.md");
        assert!(matches!(page, Err(Error::InvalidKind)));
        Ok(())
    }

    #[test]
    fn test_missing_fields() {
        let (page, _) = parse("---\ntitle: A\ntemplate: post\n---\n", Format::Markdown, "", "a.md");
        assert!(matches!(page, Err(Error::MissingField("date"))));

        let (page, _) = parse("---\ndate: 01-01-2023\ntemplate: post\n---\n", Format::Markdown, "", "a.md");
        assert!(matches!(page, Err(Error::MissingField("title"))));

        let (page, _) = parse("---\ntitle: A\ndate: 01-01-2023\n---\n", Format::Markdown, "", "a.md");
        assert!(matches!(page, Err(Error::MissingField("template"))));
    }

    #[test]
    fn test_invalid_year() {
        let (page, _) = parse(
            "---\ntitle: A\ndate: 2023-01-01\ntemplate: post\n---\n",
            Format::Markdown,
            "",
            "a.md",
        );
        assert!(matches!(page, Err(Error::InvalidYear(ref d)) if d == "2023-01-01"));
    }

    #[test]
    fn test_timestamp_offset_is_not_a_year() {
        let (page, _) = parse(
            "---\ntitle: A\ndate: 'Sun, 01 Jan 2023 10:00:00 +0000'\ntemplate: post\n---\n",
            Format::Markdown,
            "",
            "a.md",
        );
        assert!(
            matches!(page, Err(Error::InvalidYear(ref d)) if d == "Sun, 01 Jan 2023 10:00:00 +0000")
        );
    }

    #[test]
    fn test_invalid_tag() {
        for bad in &["a/b", "..", "back\\slash"] {
            let input = format!(
                "---\ntitle: A\ndate: 01-01-2023\ntags: ['ok', '{}']\ntemplate: post\n---\n",
                bad
            );
            let (page, tags) = parse(&input, Format::Markdown, "", "a.md");
            assert!(matches!(page, Err(Error::InvalidTag(ref t)) if t == *bad), "{}", bad);
            assert!(tags.is_empty());
        }
    }

    #[test]
    fn test_split_frontmatter() -> Result<()> {
        assert_eq!(split_frontmatter("---\na: 1\n---\nbody\n")?, ("a: 1\n", "body\n"));
        assert_eq!(split_frontmatter("---\r\na: 1\r\n---\r\nbody")?, ("a: 1\r\n", "body"));
        assert_eq!(split_frontmatter("---\na: '---x'\n---")?, ("a: '---x'\n", ""));
        assert!(matches!(split_frontmatter("a: 1\n"), Err(Error::FrontmatterMissingStartFence)));
        assert!(matches!(split_frontmatter("---\na: 1\n"), Err(Error::FrontmatterMissingEndFence)));
        Ok(())
    }

    #[test]
    fn test_malformed_yaml() {
        let (page, _) = parse("---\ntitle: [unclosed\n---\n", Format::Markdown, "", "a.md");
        assert!(matches!(page, Err(Error::DeserializeYaml(_))));
    }

    #[test]
    fn test_empty_screenplay() {
        let (page, _) = parse(
            "---\ntitle: A\ndate: 01-01-2023\ntemplate: script\n---\n\n",
            Format::Fountain,
            "",
            "a.fountain",
        );
        assert!(matches!(page, Err(Error::Convert(markdown::Error::EmptyScript))));
    }
}
