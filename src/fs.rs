use std::collections::HashSet;
use std::fs::metadata;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Context, IOContext, IOError, IOErrorExt, Result};

pub fn current_dir() -> Result<PathBuf> {
    let path = std::env::current_dir().context(Context::None, IOContext::CurrentDir)?;
    Ok(path)
}

/// Keeps the candidates that are directories on disk, in order, dropping repeats.
pub fn existing<I, P>(candidates: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(Into::into)
        .filter(|p| p.is_dir())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

pub struct Check {
    context: Context,
}

impl Check {
    pub fn new(context: Context) -> Self {
        Check { context }
    }

    pub fn check<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let path = path.as_ref();

        match metadata(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.err(IOContext::NotFound(path.into()), io::ErrorKind::Other)
            }
            Err(e) => self.err(IOContext::Read(path.into()), e),
            Ok(_) => Ok(()),
        }
    }

    fn err<E: Into<io::Error>>(self, iocontext: IOContext, err: E) -> Result<()> {
        Err(IOError::new(self.context, iocontext, err.into()).into())
    }
}

pub fn resolve_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let cwd = current_dir()?;
    Ok(resolve_path_relative(path, &cwd))
}

pub fn resolve_path_relative<P1: AsRef<Path>, P2: AsRef<Path>>(path: P1, cwd: P2) -> PathBuf {
    let path = path.as_ref();
    let cwd = cwd.as_ref();
    let buf;

    let path = if path.is_absolute() {
        path
    } else {
        buf = cwd.join(path);
        buf.as_path()
    };

    let mut ret = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }

    ret
}
