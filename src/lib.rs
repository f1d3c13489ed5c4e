//! The library code for the `quire` static site generator. A build is a single
//! synchronous pass made of four steps:
//!
//! 1. Walking the content tree and parsing every Markdown and Fountain file
//!    into a [`page::Page`] ([`crate::walk`], [`crate::parser`],
//!    [`crate::collection`])
//! 2. Planning the site: dropping drafts, ordering pages newest first, and
//!    grouping them by year ([`crate::plan`])
//! 3. Rendering one HTML file per page and one per tag ([`crate::write`])
//! 4. Writing the RSS feed ([`crate::feed`])
//!
//! The tag index is built during the first step and only read from the second
//! step on, so nothing is rendered until every file has been parsed. Any
//! error aborts the build.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod collection;
pub mod config;
pub mod date;
pub mod feed;
pub mod fountain;
pub mod markdown;
pub mod page;
pub mod parser;
pub mod plan;
pub mod tag;
pub mod value;
pub mod walk;
pub mod write;
