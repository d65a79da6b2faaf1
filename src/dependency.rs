use std::path::{Path, PathBuf};

/// A resolved dependency, referenced through its opt path.
///
/// The directories exposed here are fixed locations under
/// [`opt_prefix`](`Dependency::opt_prefix`). Whether the dependency is keg-only
/// or only needed at run time is decided by whoever resolved it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub name: String,
    pub opt_prefix: PathBuf,
    pub keg_only: bool,
    pub run_time: bool,
}

impl Dependency {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, opt_prefix: P) -> Self {
        Dependency {
            name: name.into(),
            opt_prefix: opt_prefix.into(),
            keg_only: false,
            run_time: false,
        }
    }

    /// A dependency installed under `prefix`, i.e. at `prefix/opt/name`.
    pub fn installed<S: Into<String>>(name: S, prefix: &Path) -> Self {
        let name = name.into();
        let opt_prefix = prefix.join("opt").join(&name);
        Dependency::new(name, opt_prefix)
    }

    pub fn keg_only(mut self) -> Self {
        self.keg_only = true;
        self
    }

    pub fn run_time(mut self) -> Self {
        self.run_time = true;
        self
    }

    pub fn prefix(&self) -> &Path {
        &self.opt_prefix
    }

    pub fn bin(&self) -> PathBuf {
        self.opt_prefix.join("bin")
    }

    pub fn lib(&self) -> PathBuf {
        self.opt_prefix.join("lib")
    }

    pub fn include(&self) -> PathBuf {
        self.opt_prefix.join("include")
    }

    pub fn share(&self) -> PathBuf {
        self.opt_prefix.join("share")
    }

    pub fn frameworks(&self) -> PathBuf {
        self.opt_prefix.join("Frameworks")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    deps: Vec<Dependency>,
}

impl DependencySet {
    pub fn new(deps: Vec<Dependency>) -> Self {
        DependencySet { deps }
    }

    pub fn push(&mut self, dep: Dependency) {
        self.deps.push(dep);
    }

    pub fn all(&self) -> impl Iterator<Item = &Dependency> {
        self.deps.iter()
    }

    pub fn keg_only(&self) -> impl Iterator<Item = &Dependency> {
        self.deps.iter().filter(|d| d.keg_only)
    }

    pub fn run_time(&self) -> impl Iterator<Item = &Dependency> {
        self.deps.iter().filter(|d| d.run_time)
    }

    pub fn find(&self, name: &str) -> Option<&Dependency> {
        self.deps.iter().find(|d| d.name == name)
    }

    pub fn contains_any(&self, names: &[&str]) -> bool {
        self.deps.iter().any(|d| names.contains(&d.name.as_str()))
    }

    pub fn names(&self) -> String {
        self.deps
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }
}

impl FromIterator<Dependency> for DependencySet {
    fn from_iter<T: IntoIterator<Item = Dependency>>(iter: T) -> Self {
        DependencySet::new(iter.into_iter().collect())
    }
}
