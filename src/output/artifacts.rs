//! On-disk layout of downloaded books

use crate::url::filename_from_link;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

/// Subdirectory used when a category has a single level
pub const GENERAL_DIRECTORY: &str = "general";

/// Where a book's files go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub directory: PathBuf,
    pub pdf: PathBuf,
    pub summary: PathBuf,
}

/// Computes the save paths for a book
///
/// The category path is placed under `root`; a category with a single segment gets a
/// `general` subdirectory. Spaces become underscores in every component, and `.`, `..`
/// and empty segments of the category are dropped. The summary sits next to the PDF with
/// a `.txt` extension.
///
/// # Examples
///
/// ```
/// use shelf_sweep::output::artifact_paths;
/// use std::path::Path;
///
/// let paths = artifact_paths(
///     Path::new("allitebook"),
///     "web-development/",
///     "http://file.allitebooks.com/20170101/Learning React.pdf",
/// );
/// assert_eq!(paths.pdf, Path::new("allitebook/web-development/general/Learning_React.pdf"));
/// assert_eq!(paths.summary, Path::new("allitebook/web-development/general/Learning_React.txt"));
/// ```
pub fn artifact_paths(root: &Path, category: &str, pdf_link: &str) -> ArtifactPaths {
    let segments: Vec<String> = category
        .split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(underscored)
        .collect();

    let mut directory = underscored_path(root);
    for segment in &segments {
        directory.push(segment);
    }
    if segments.len() == 1 {
        directory.push(GENERAL_DIRECTORY);
    }

    let pdf = directory.join(underscored(filename_from_link(pdf_link)));
    let summary = pdf.with_extension("txt");

    ArtifactPaths {
        directory,
        pdf,
        summary,
    }
}

/// Creates `path` and its parents; an already existing directory is fine
pub fn assure_directory(path: &Path) -> io::Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}

/// Writes the PDF and its summary, creating the directory first
///
/// Existing files are replaced.
pub fn write_artifacts(paths: &ArtifactPaths, pdf: &[u8], summary: &str) -> io::Result<()> {
    assure_directory(&paths.directory)?;
    fs::write(&paths.pdf, pdf)?;
    fs::write(&paths.summary, summary)?;

    tracing::debug!("Wrote {} ({} bytes)", paths.pdf.display(), pdf.len());
    Ok(())
}

fn underscored(segment: &str) -> String {
    segment.replace(' ', "_")
}

fn underscored_path(path: &Path) -> PathBuf {
    path.components()
        .map(|component| match component {
            Component::Normal(name) => PathBuf::from(underscored(&name.to_string_lossy())),
            other => PathBuf::from(other.as_os_str()),
        })
        .collect()
}
