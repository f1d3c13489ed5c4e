//! Conversions from pages, YAML, and configuration into template [`Value`]s.

use crate::config::SiteConfig;
use crate::page::Page;
use crate::plan::SitePlan;
use gtmpl_value::Value;
use std::collections::HashMap;

/// Converts a YAML value. Mapping keys that aren't scalars are dropped.
pub fn from_yaml(value: &serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Nil,
        serde_yaml::Value::Bool(b) => Value::from(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                Value::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_yaml::Value::String(s) => Value::from(s.as_str()),
        serde_yaml::Value::Sequence(items) => Value::Array(items.iter().map(from_yaml).collect()),
        serde_yaml::Value::Mapping(mapping) => Value::Object(object_from_mapping(mapping)),
    }
}

fn object_from_mapping(mapping: &serde_yaml::Mapping) -> HashMap<String, Value> {
    let mut m = HashMap::with_capacity(mapping.len());
    for (key, value) in mapping.iter() {
        let key = match key {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        m.insert(key, from_yaml(value));
    }
    m
}

fn strings(items: &[String]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(s.as_str())).collect())
}

fn optional(s: &Option<String>) -> Value {
    match s {
        Some(s) => Value::from(s.as_str()),
        None => Value::Nil,
    }
}

/// Converts a [`Page`] into the fields a template sees: every front-matter
/// attribute, overlaid with the derived fields (`content`, `location`, `url`,
/// `year`, `kind`, ...).
pub fn page_fields(page: &Page) -> HashMap<String, Value> {
    let mut m = object_from_mapping(&page.attributes);
    m.insert("title".to_owned(), Value::from(page.title.as_str()));
    m.insert("date".to_owned(), Value::from(page.date.as_str()));
    m.insert("tags".to_owned(), strings(&page.tags));
    m.insert("template".to_owned(), Value::from(page.template.as_str()));
    m.insert("draft".to_owned(), Value::from(page.draft));
    m.insert("description".to_owned(), optional(&page.description));
    m.insert("kind".to_owned(), Value::from(page.kind.as_str()));
    m.insert("content".to_owned(), Value::from(page.content.as_str()));
    m.insert("location".to_owned(), Value::from(page.location.as_str()));
    m.insert("url".to_owned(), Value::from(page.url.as_str()));
    m.insert("year".to_owned(), Value::from(page.year.as_str()));
    m
}

impl From<&Page> for Value {
    fn from(page: &Page) -> Value {
        Value::Object(page_fields(page))
    }
}

/// Builds the `site` object shared by every template: the configuration's
/// public fields and free-form attributes, plus `pages` (all published
/// pages, newest first) and `tags` (sorted).
pub fn site(config: &SiteConfig, plan: &SitePlan) -> Value {
    let mut m = object_from_mapping(&config.attributes);
    m.insert("title".to_owned(), Value::from(config.title.as_str()));
    m.insert("description".to_owned(), Value::from(config.description.as_str()));
    m.insert("url".to_owned(), Value::from(config.url.as_str()));
    m.insert("baseUrl".to_owned(), Value::from(config.base_url.as_str()));
    m.insert("author".to_owned(), Value::from(config.author.as_str()));
    m.insert("email".to_owned(), Value::from(config.email.as_str()));
    m.insert("aboutLink".to_owned(), optional(&config.about_link));
    m.insert("image".to_owned(), optional(&config.image));
    m.insert("favicon".to_owned(), optional(&config.favicon));
    m.insert(
        "pages".to_owned(),
        Value::Array(plan.pages.iter().map(Value::from).collect()),
    );
    m.insert("tags".to_owned(), strings(&plan.tags));
    Value::Object(m)
}

/// Builds `pagesByYear`: a list of `{year, pages}` objects, newest year
/// first.
pub fn pages_by_year(plan: &SitePlan) -> Value {
    Value::Array(
        plan.years
            .iter()
            .map(|group| {
                let mut m = HashMap::new();
                m.insert("year".to_owned(), Value::from(group.year.as_str()));
                m.insert(
                    "pages".to_owned(),
                    Value::Array(plan.group_pages(group).map(Value::from).collect()),
                );
                Value::Object(m)
            })
            .collect(),
    )
}
