//! Defines [`SiteConfig`], the read-only site configuration, and the logic
//! for finding and loading it from a `quire.yaml` file.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by
/// [`SiteConfig::from_directory`].
pub const CONFIG_FILE_NAME: &str = "quire.yaml";

/// The site configuration. Location fields are resolved against the
/// directory containing the project file by [`SiteConfig::from_project_file`];
/// when constructed directly they are taken as-is.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// The absolute site URL, e.g. `https://example.com/`. Feed item links
    /// are `{url}{location}`.
    pub url: Url,

    /// The path prefix for page URLs. A page at location `posts/a` has the
    /// URL `/{base_url}/posts/a`.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub about_link: Option<String>,

    /// File and directory names skipped during traversal.
    #[serde(default)]
    pub excludes: Vec<String>,

    #[serde(default = "default_pages_loc")]
    pub pages_loc: PathBuf,

    #[serde(default = "default_templates_loc")]
    pub templates_loc: PathBuf,

    #[serde(default = "default_output_loc")]
    pub output_loc: PathBuf,

    /// Site-relative path of the feed image.
    #[serde(default)]
    pub image: Option<String>,

    /// Site-relative path of the favicon.
    #[serde(default)]
    pub favicon: Option<String>,

    /// Free-form values merged into every template's `site` object.
    #[serde(default)]
    pub attributes: serde_yaml::Mapping,
}

fn default_pages_loc() -> PathBuf {
    PathBuf::from("pages")
}

fn default_templates_loc() -> PathBuf {
    PathBuf::from("templates")
}

fn default_output_loc() -> PathBuf {
    PathBuf::from("dist")
}

impl SiteConfig {
    /// Searches `dir` and then each of its ancestors for a [`CONFIG_FILE_NAME`]
    /// file and loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<SiteConfig> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            SiteConfig::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => SiteConfig::from_directory(parent),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    CONFIG_FILE_NAME
                )),
            }
        }
    }

    /// Loads the configuration from `path` and resolves the relative
    /// locations against the directory containing it.
    pub fn from_project_file(path: &Path) -> Result<SiteConfig> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let config: SiteConfig = serde_yaml::from_reader(file)
            .with_context(|| format!("Loading configuration `{}`", path.display()))?;
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        Ok(config.rooted_at(project_root))
    }

    /// Resolves `pages_loc`, `templates_loc`, and `output_loc` against
    /// `root`. Absolute locations are left alone.
    pub fn rooted_at(mut self, root: &Path) -> SiteConfig {
        self.pages_loc = root.join(&self.pages_loc);
        self.templates_loc = root.join(&self.templates_loc);
        self.output_loc = root.join(&self.output_loc);
        self
    }

    /// Returns `true` if a directory entry named `name` should be skipped.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|e| e == name)
    }

    /// Returns the site URL of the page at `location`, i.e.
    /// `/{base_url}/{location}`.
    pub fn page_url(&self, location: &str) -> String {
        let base = self.base_url.trim_matches('/');
        if base.is_empty() {
            format!("/{}", location)
        } else {
            format!("/{}/{}", base, location)
        }
    }

    /// Returns the absolute URL `{url}{path}`. `Url` always renders with a
    /// trailing slash on an empty path, so `path` should not start with one.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CONFIG: &str = r#"
title: Notebook
description: Things I wrote down
url: https://example.com
baseUrl: blog
author: Jo
email: jo@example.com
excludes: [drafts, .DS_Store]
attributes:
  twitter: jo
"#;

    #[test]
    fn test_deserialize_with_defaults() -> Result<()> {
        let config: SiteConfig = serde_yaml::from_str(CONFIG)?;
        assert_eq!(config.title, "Notebook");
        assert_eq!(config.base_url, "blog");
        assert_eq!(config.pages_loc, PathBuf::from("pages"));
        assert_eq!(config.templates_loc, PathBuf::from("templates"));
        assert_eq!(config.output_loc, PathBuf::from("dist"));
        assert!(config.is_excluded("drafts"));
        assert!(!config.is_excluded("posts"));
        assert_eq!(config.attributes.len(), 1);
        Ok(())
    }

    #[test]
    fn test_urls() -> Result<()> {
        let mut config: SiteConfig = serde_yaml::from_str(CONFIG)?;
        assert_eq!(config.page_url("posts/a"), "/blog/posts/a");
        assert_eq!(config.absolute_url("posts/a"), "https://example.com/posts/a");
        config.base_url = String::new();
        assert_eq!(config.page_url("posts/a"), "/posts/a");
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let root = tempfile::tempdir()?;
        std::fs::write(root.path().join(CONFIG_FILE_NAME), CONFIG)?;
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;

        let config = SiteConfig::from_directory(&nested)?;
        assert_eq!(config.pages_loc, root.path().join("pages"));
        assert_eq!(config.output_loc, root.path().join("dist"));
        Ok(())
    }
}
