use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Set of book links that are never processed
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    links: HashSet<String>,
}

impl Blacklist {
    /// Loads a blacklist file with one link per line
    ///
    /// Lines are trimmed and blank lines ignored. A missing file is an empty blacklist.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content.lines().collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Blacklist {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let links = iter
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { links }
    }
}
