use quire::build::build_site;
use quire::config::SiteConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const CONFIG: &str = r#"
title: Notebook
description: Things I wrote down
url: https://example.com
baseUrl: blog
author: Jo
email: jo@example.com
excludes: [scratch]
attributes:
  tagline: mostly harmless
"#;

const POST: &str = "{{template \"head\" .}}<article>{{.content}}</article>";
const BLOG: &str = "{{template \"head\" .}}{{range .pagesByYear}}<h2>{{.year}}</h2>{{range .pages}}<a href=\"{{.url}}\">{{.title}}</a>{{end}}{{end}}";
const TAGPAGE: &str = "{{template \"head\" .}}{{range .pages}}<a href=\"{{.url}}\">{{.title}}</a>{{end}}";
const HEAD: &str = "{{define \"head\"}}<title>{{.title}} | {{.site.title}}</title><p>{{.site.tagline}}</p>{{end}}";

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    let r = root.path();
    write(r, "quire.yaml", CONFIG);
    write(r, "templates/post.html", POST);
    write(r, "templates/blog.html", BLOG);
    write(r, "templates/tagpage.html", TAGPAGE);
    write(r, "templates/_head.html", HEAD);

    write(
        r,
        "pages/blog.md",
        "---\ntitle: Blog\ndate: 01-01-0000\ntemplate: blog\nkind: index\n---\n",
    );
    write(
        r,
        "pages/posts/a.md",
        "---\ntitle: A\ndate: 01-01-2023\ntags: [x, y]\ntemplate: post\n---\n# Hi\n\nThere.\n",
    );
    write(
        r,
        "pages/posts/b.md",
        "---\ntitle: B\ndate: 06-01-2022\ntags: [y]\ntemplate: post\ndescription: The second one\n---\nB body\n",
    );
    write(
        r,
        "pages/posts/wip.md",
        "---\ntitle: WIP\ndate: 07-01-2023\ntags: [secret]\ntemplate: post\ndraft: true\n---\nnot yet\n",
    );
    write(
        r,
        "pages/scripts/kettle.fountain",
        "---\ntitle: Kettle\ndate: 03-02-2021\ntemplate: post\n---\nINT. KITCHEN - NIGHT\n\nThe kettle whistles.\n",
    );
    write(r, "pages/scratch/ignored.md", "not even front matter");
    write(r, "pages/posts/photo.jpg", "binary-ish");
    root
}

/// Every file under `dir`, relative path to contents.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            (
                e.path().strip_prefix(dir).unwrap().to_owned(),
                fs::read(e.path()).unwrap(),
            )
        })
        .collect()
}

fn read(path: PathBuf) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_build_site() {
    let root = project();
    let config = SiteConfig::from_directory(root.path()).unwrap();
    let summary = build_site(&config).unwrap();
    let dist = root.path().join("dist");

    assert_eq!(summary.parsed, 5);
    assert_eq!(summary.drafts, 1);
    assert_eq!(summary.pages, 4);
    assert_eq!(summary.tags, 2);

    let files: Vec<PathBuf> = snapshot(&dist).into_iter().map(|(p, _)| p).collect();
    let want: Vec<PathBuf> = vec![
        "blog.html",
        "posts/a.html",
        "posts/b.html",
        "rss.xml",
        "scripts/kettle.html",
        "tags/x.html",
        "tags/y.html",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(files, want);

    assert_eq!(
        read(dist.join("posts/a.html")),
        "<title>A | Notebook</title><p>mostly harmless</p><article><h1>Hi</h1><p>There.</p></article>"
    );
    assert!(read(dist.join("scripts/kettle.html"))
        .contains("<h3>INT. KITCHEN - NIGHT</h3>\n<p>The kettle whistles.</p>"));
    assert_eq!(
        read(dist.join("blog.html")),
        "<title>Blog | Notebook</title><p>mostly harmless</p>\
         <h2>2023</h2><a href=\"/blog/posts/a\">A</a>\
         <h2>2022</h2><a href=\"/blog/posts/b\">B</a>\
         <h2>2021</h2><a href=\"/blog/scripts/kettle\">Kettle</a>"
    );
    assert_eq!(
        read(dist.join("tags/y.html")),
        "<title>y | Notebook</title><p>mostly harmless</p>\
         <a href=\"/blog/posts/a\">A</a><a href=\"/blog/posts/b\">B</a>"
    );

    let rss = read(dist.join("rss.xml"));
    assert!(!rss.contains("WIP"));
    let a = rss.find("https://example.com/posts/a").unwrap();
    let b = rss.find("https://example.com/posts/b").unwrap();
    let kettle = rss.find("https://example.com/scripts/kettle").unwrap();
    assert!(a < b && b < kettle);
    assert!(rss.contains("<description>The second one</description>"));
}

#[test]
fn test_build_is_idempotent() {
    let root = project();
    let config = SiteConfig::from_directory(root.path()).unwrap();

    build_site(&config).unwrap();
    let first = snapshot(&root.path().join("dist"));
    build_site(&config).unwrap();
    let second = snapshot(&root.path().join("dist"));

    assert_eq!(first, second);
}

#[test]
fn test_missing_date_aborts() {
    let root = project();
    write(
        root.path(),
        "pages/posts/undated.md",
        "---\ntitle: Undated\ntemplate: post\n---\nbody\n",
    );
    let config = SiteConfig::from_directory(root.path()).unwrap();

    let err = build_site(&config).unwrap_err();
    assert!(err.to_string().contains("undated.md"));
    assert!(err.to_string().contains("`date`"));
    assert!(!root.path().join("dist/rss.xml").exists());
}
