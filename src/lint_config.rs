use std::{fmt::Display, path::PathBuf};

use crate::{
    build_env::Category,
    config::Config,
    error::LintKind,
    raw::{RawConfig, Value, Variable},
};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Warning {
    MissingShims(PathBuf),
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingShims(p) => write!(
                f,
                "shims directory {} does not exist, builds will find the system compilers first",
                p.display()
            ),
        }
    }
}

impl RawConfig {
    pub(crate) fn lint(&self, lints: &mut Vec<LintKind>) {
        lint_arrays(self.variables.iter(), lints);
        lint_newline(self.variables.iter(), lints);
    }
}

impl Config {
    pub fn warnings(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        warn_shims(self, &mut warnings);

        warnings
    }

    pub(crate) fn lint(&self, lints: &mut Vec<LintKind>) {
        lint_absolute(self, lints);
        lint_extra_paths(self, lints);
    }
}

fn warn_shims(config: &Config, warnings: &mut Vec<Warning>) {
    if !config.shims_dir.is_dir() {
        warnings.push(Warning::MissingShims(config.shims_dir.clone()))
    }
}

fn lint_absolute(config: &Config, lints: &mut Vec<LintKind>) {
    let paths = [
        ("HOMEBREW_PREFIX", &config.prefix),
        ("HOMEBREW_CELLAR", &config.cellar),
        ("HOMEBREW_LIBRARY", &config.library),
        ("HOMEBREW_SHIMS_PATH", &config.shims_dir),
        ("HOMEBREW_TEMP", &config.temp),
        ("HOMEBREW_BREW_FILE", &config.brew_file),
    ];

    for (name, path) in paths {
        if !path.is_absolute() {
            lints.push(LintKind::NotAbsolute(name.to_string(), path.clone()))
        }
    }
}

fn lint_extra_paths(config: &Config, lints: &mut Vec<LintKind>) {
    for category in Category::ALL {
        let Some(key) = category.config_key() else {
            continue;
        };
        for path in config.extra_paths.get(category) {
            if !path.is_absolute() {
                lints.push(LintKind::NotAbsolute(key.to_string(), path.clone()))
            }
        }
    }
}

fn lint_newline<'a, I: Iterator<Item = &'a Variable>>(iter: I, lints: &mut Vec<LintKind>) {
    for var in iter {
        match &var.value {
            Value::Array(a) => {
                if a.iter().any(|v| v.contains('\n')) {
                    lints.push(LintKind::VariableContainsNewlines(var.name.clone()))
                }
            }
            Value::String(s) => {
                if s.contains('\n') {
                    lints.push(LintKind::VariableContainsNewlines(var.name.clone()))
                }
            }
        }
    }
}

fn lint_arrays<'a, I: Iterator<Item = &'a Variable>>(iter: I, lints: &mut Vec<LintKind>) {
    for var in iter {
        if let Value::Array(a) = &var.value {
            if a.iter().any(|v| v.is_empty()) {
                lints.push(LintKind::VariableContainsEmptyString(var.name.clone()))
            }
        }
    }
}
