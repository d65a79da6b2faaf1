use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use crate::lint_config::*;
use crate::{
    build_env::{Category, ExtraPaths},
    error::{Context, LintError, LintKind, Result},
    fs::{resolve_path, Check},
    installation_variables::{LIBRARY, PREFIX, SYSCONFDIR, TEMPDIR},
    raw::{RawConfig, Value, Variable},
    TOOL_NAME,
};

/// Variables read from the process environment. These win over config files.
pub const ENV_OVERRIDES: &[&str] = &[
    "HOMEBREW_PREFIX",
    "HOMEBREW_CELLAR",
    "HOMEBREW_LIBRARY",
    "HOMEBREW_SHIMS_PATH",
    "HOMEBREW_TEMP",
    "HOMEBREW_BREW_FILE",
    "HOMEBREW_MAKE_JOBS",
];

/// Where the package manager lives and how builds should be set up.
///
/// Defaults come from the installation paths the crate was built with and can
/// be overridden by config files and then by the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prefix: PathBuf,
    pub cellar: PathBuf,
    pub library: PathBuf,
    /// Compiler shims that must come first in `PATH`.
    pub shims_dir: PathBuf,
    pub temp: PathBuf,
    pub brew_file: PathBuf,
    /// Parallel jobs for make. Defaults to the number of cores.
    pub make_jobs: Option<usize>,
    pub extra_paths: ExtraPaths,
}

impl Default for Config {
    fn default() -> Self {
        let library = PathBuf::from(LIBRARY);
        Config {
            shims_dir: shims_dir(&library),
            library,
            ..Config::with_prefix(PREFIX)
        }
    }
}

fn shims_dir(library: &Path) -> PathBuf {
    library.join("Homebrew/shims/super")
}

impl Config {
    pub fn config_file() -> PathBuf {
        Path::new(SYSCONFDIR).join(format!("{}.conf", TOOL_NAME))
    }

    pub fn new() -> Result<Self> {
        Config::load(None)
    }

    pub fn from_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        Config::load(Some(path.into()))
    }

    /// A config with every location derived from `prefix`.
    pub fn with_prefix<P: Into<PathBuf>>(prefix: P) -> Self {
        let prefix = prefix.into();
        let library = prefix.join("Library");
        Config {
            cellar: prefix.join("Cellar"),
            shims_dir: shims_dir(&library),
            library,
            temp: PathBuf::from(TEMPDIR),
            brew_file: prefix.join("bin/brew"),
            prefix,
            make_jobs: None,
            extra_paths: ExtraPaths::default(),
        }
    }

    pub fn opt(&self) -> PathBuf {
        self.prefix.join("opt")
    }

    fn load(config: Option<PathBuf>) -> Result<Self> {
        let files = Config::config_files(config)?;
        Config::load_from(&files, |key| std::env::var(key).ok())
    }

    fn config_files(config: Option<PathBuf>) -> Result<Vec<PathBuf>> {
        let explicit = config.or_else(|| {
            std::env::var_os(format!("{}_CONF", TOOL_NAME.to_uppercase())).map(PathBuf::from)
        });

        if let Some(path) = explicit {
            Check::new(Context::ReadConfig).check(&path)?;
            return Ok(vec![resolve_path(path)?]);
        }

        let mut files = Vec::new();
        let system = Config::config_file();
        if system.exists() {
            files.push(system);
        }

        let name = format!("{}.conf", TOOL_NAME);
        let user = dirs::config_dir()
            .map(|d| d.join(TOOL_NAME).join(&name))
            .filter(|d| d.exists());

        if let Some(path) = user {
            files.push(path);
        } else if let Some(home) = dirs::home_dir() {
            let path = home.join(format!(".{}", name));
            if path.exists() {
                files.push(path);
            }
        }

        Ok(files)
    }

    /// Reads `files` in order, later files overriding earlier ones, then applies
    /// the [`ENV_OVERRIDES`] found through `env`.
    pub fn load_from<P, F>(files: &[P], env: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawConfig::from_paths(files)?;
        for key in ENV_OVERRIDES {
            if let Some(value) = env(key).filter(|v| !v.is_empty()) {
                raw.variables
                    .push(Variable::new(*key, Value::String(value)));
            }
        }

        let mut lints = Vec::new();
        raw.lint(&mut lints);
        let config = Config::parse_raw(raw, &mut lints);
        config.lint(&mut lints);

        if !lints.is_empty() {
            return Err(LintError::config(lints).into());
        }

        Ok(config)
    }

    fn parse_raw(raw: RawConfig, lints: &mut Vec<LintKind>) -> Config {
        let mut vars = raw
            .variables
            .into_iter()
            .map(|v| (v.name.clone(), v))
            .collect::<BTreeMap<_, _>>();

        let mut path = |name: &str, lints: &mut Vec<LintKind>| {
            vars.remove(name)
                .and_then(|v| v.lint_string(lints))
                .map(PathBuf::from)
        };

        let mut config = match path("HOMEBREW_PREFIX", lints) {
            Some(prefix) => Config::with_prefix(prefix),
            None => Config::default(),
        };

        if let Some(library) = path("HOMEBREW_LIBRARY", lints) {
            config.shims_dir = shims_dir(&library);
            config.library = library;
        }
        if let Some(cellar) = path("HOMEBREW_CELLAR", lints) {
            config.cellar = cellar;
        }
        if let Some(shims) = path("HOMEBREW_SHIMS_PATH", lints) {
            config.shims_dir = shims;
        }
        if let Some(temp) = path("HOMEBREW_TEMP", lints) {
            config.temp = temp;
        }
        if let Some(brew_file) = path("HOMEBREW_BREW_FILE", lints) {
            config.brew_file = brew_file;
        }

        if let Some(jobs) = vars
            .remove("HOMEBREW_MAKE_JOBS")
            .and_then(|v| v.lint_string(lints))
        {
            match jobs.parse::<usize>() {
                Ok(n) if n > 0 => config.make_jobs = Some(n),
                _ => lints.push(LintKind::InvalidMakeJobs(jobs)),
            }
        }

        for category in Category::ALL {
            if let Some(var) = category.config_key().and_then(|key| vars.remove(key)) {
                let paths = var.lint_path_array(lints);
                config.extra_paths.set(category, paths);
            }
        }

        config
    }
}
