use anyhow::{Context, Result};
use clap::{App, Arg};
use quire::build::build_site;
use quire::config::SiteConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static site from markdown and screenplay content")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Path to the project file (defaults to the nearest quire.yaml)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .help("Output directory (overrides outputLoc)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log every file"),
        )
        .get_matches();

    let filter = match matches.is_present("verbose") {
        true => EnvFilter::new("debug"),
        false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(matches.value_of("config"), matches.value_of("output")) {
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }
}

fn run(config_path: Option<&str>, output: Option<&str>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => SiteConfig::from_project_file(Path::new(path))?,
        None => SiteConfig::from_directory(
            &std::env::current_dir().context("Getting current directory")?,
        )?,
    };
    if let Some(output) = output {
        config.output_loc = PathBuf::from(output);
    }

    let summary = build_site(&config).context("Building site")?;
    info!(
        parsed = summary.parsed,
        drafts = summary.drafts,
        pages = summary.pages,
        tags = summary.tags,
        "built site into {}",
        config.output_loc.display()
    );
    Ok(())
}
