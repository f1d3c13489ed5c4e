//! Recursive discovery of content files. See [`walk`].

use crate::markdown::Format;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// The deepest directory nesting [`walk`] will descend into.
pub const MAX_DEPTH: usize = 64;

/// A content file found by [`walk`].
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    /// The path to the file on disk.
    pub path: PathBuf,

    /// The directory containing the file, relative to the content root.
    pub parent: PathBuf,

    /// The file's name, including its extension.
    pub file_name: String,

    /// The content format, chosen by extension.
    pub format: Format,
}

/// Walks the content tree under `root` depth-first (directories before
/// their contents, siblings in file-name order) and returns every `.md` and
/// `.fountain` file. Entries whose name `is_excluded` are skipped along with
/// everything beneath them; other files are ignored. Before a directory's
/// contents are visited, the mirrored directory under `output_root` is
/// created if missing. A directory nested [`MAX_DEPTH`] levels down is an
/// error.
pub fn walk<F>(root: &Path, is_excluded: F, output_root: &Path) -> Result<Vec<SourceFile>>
where
    F: Fn(&str) -> bool,
{
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(MAX_DEPTH)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(|entry| {
            // the root itself is never excluded
            entry.depth() == 0 || !entry.file_name().to_str().map_or(false, &is_excluded)
        });

    for result in walker {
        let entry = result?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::OutsideRoot(entry.path().to_owned()))?;

        if entry.file_type().is_dir() {
            if entry.depth() >= MAX_DEPTH {
                return Err(Error::TooDeep(entry.path().to_owned()));
            }
            let dir = output_root.join(relative);
            std::fs::create_dir_all(&dir).map_err(|err| Error::CreateDir {
                path: dir.clone(),
                err,
            })?;
            continue;
        }

        let format = match entry.path().extension().and_then(|e| e.to_str()) {
            Some(extension) => match Format::from_extension(extension) {
                Some(format) => format,
                None => continue,
            },
            None => continue,
        };
        let file_name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| Error::InvalidFileName(entry.path().to_owned()))?
            .to_owned();

        debug!(path = %entry.path().display(), "found content file");
        files.push(SourceFile {
            path: entry.path().to_owned(),
            parent: relative.parent().map(Path::to_owned).unwrap_or_default(),
            file_name,
            format,
        });
    }

    Ok(files)
}

/// The result of a fallible traversal.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error walking the content tree.
#[derive(Debug)]
pub enum Error {
    /// Returned when a directory can't be listed or an entry can't be
    /// inspected.
    WalkDir(walkdir::Error),

    /// Returned when a mirrored output directory can't be created.
    CreateDir { path: PathBuf, err: std::io::Error },

    /// Returned when a content file's name isn't valid UTF-8.
    InvalidFileName(PathBuf),

    /// Returned when a directory is nested too deeply to be walked.
    TooDeep(PathBuf),

    /// Returned when an entry isn't beneath the walk root, which would
    /// mean a symlink escaped it.
    OutsideRoot(PathBuf),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::WalkDir(err) => err.fmt(f),
            Error::CreateDir { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
            Error::TooDeep(path) => write!(
                f,
                "'{}' is nested more than {} directories deep",
                path.display(),
                MAX_DEPTH
            ),
            Error::OutsideRoot(path) => {
                write!(f, "'{}' is outside the content root", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::WalkDir(err) => Some(err),
            Error::CreateDir { path: _, err } => Some(err),
            Error::InvalidFileName(_) => None,
            Error::TooDeep(_) => None,
            Error::OutsideRoot(_) => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while iterating.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_walk() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let src = tempfile::tempdir()?;
        let out = tempfile::tempdir()?;
        touch(&src.path().join("index.md"));
        touch(&src.path().join("posts/b.md"));
        touch(&src.path().join("posts/a.fountain"));
        touch(&src.path().join("posts/notes.txt"));
        touch(&src.path().join("drafts/c.md"));
        touch(&src.path().join("posts/deep/d.md"));
        fs::create_dir_all(src.path().join("empty"))?;

        let files = walk(src.path(), |name| name == "drafts", out.path())?;
        let found: Vec<(PathBuf, &str, Format)> = files
            .iter()
            .map(|f| (f.parent.clone(), f.file_name.as_str(), f.format))
            .collect();

        assert_eq!(
            found,
            vec![
                (PathBuf::new(), "index.md", Format::Markdown),
                (PathBuf::from("posts"), "a.fountain", Format::Fountain),
                (PathBuf::from("posts"), "b.md", Format::Markdown),
                (PathBuf::from("posts/deep"), "d.md", Format::Markdown),
            ]
        );
        assert!(out.path().join("posts/deep").is_dir());
        assert!(out.path().join("empty").is_dir());
        assert!(!out.path().join("drafts").exists());
        Ok(())
    }

    #[test]
    fn test_walk_is_idempotent_on_existing_output() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let src = tempfile::tempdir()?;
        let out = tempfile::tempdir()?;
        touch(&src.path().join("posts/a.md"));
        fs::create_dir_all(out.path().join("posts"))?;

        assert_eq!(walk(src.path(), |_| false, out.path())?.len(), 1);
        assert_eq!(walk(src.path(), |_| false, out.path())?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_walk_missing_root() {
        let out = tempfile::tempdir().unwrap();
        let result = walk(Path::new("/definitely/not/here"), |_| false, out.path());
        assert!(matches!(result, Err(Error::WalkDir(_))));
    }

    #[test]
    fn test_walk_depth_limit() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let src = tempfile::tempdir()?;
        let out = tempfile::tempdir()?;
        touch(&src.path().join("d/".repeat(MAX_DEPTH - 1)).join("a.md"));
        assert_eq!(walk(src.path(), |_| false, out.path())?.len(), 1);

        fs::create_dir_all(src.path().join("d/".repeat(MAX_DEPTH)))?;
        let result = walk(src.path(), |_| false, out.path());
        assert!(matches!(result, Err(Error::TooDeep(_))));
        Ok(())
    }
}
