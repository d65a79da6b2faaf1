use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::fs::existing;

pub const SEPARATOR: char = ':';

/// An ordered list of search directories.
///
/// Every entry existed as a directory when the list was built and no entry
/// appears twice. Formats as a `:` separated string for the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathList(Vec<PathBuf>);

impl PathList {
    pub fn existing<I, P>(candidates: I) -> PathList
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        PathList(existing(candidates))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.0.iter().any(|p| p == path.as_ref())
    }

    pub fn position<P: AsRef<Path>>(&self, path: P) -> Option<usize> {
        self.0.iter().position(|p| p == path.as_ref())
    }

    /// The joined value, or `None` when there is nothing to search.
    pub fn value(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl Display for PathList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

impl From<PathList> for Vec<PathBuf> {
    fn from(value: PathList) -> Self {
        value.0
    }
}
