use std::{collections::BTreeMap, process::Command};

use crate::{
    cccfg::{Cccfg, Flag},
    compiler::Compiler,
};

pub const MAKEFLAGS: &str = "MAKEFLAGS";
pub const HOMEBREW_CC: &str = "HOMEBREW_CC";
pub const HOMEBREW_CXX: &str = "HOMEBREW_CXX";
pub const HOMEBREW_CCCFG: &str = "HOMEBREW_CCCFG";
pub const HOMEBREW_ARCHFLAGS: &str = "HOMEBREW_ARCHFLAGS";
pub const HOMEBREW_OPTIMIZATION_LEVEL: &str = "HOMEBREW_OPTIMIZATION_LEVEL";

/// Whether `name` can be assigned by a POSIX shell.
pub fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// The variables a build runs with.
///
/// Variables are kept sorted by name so two environments composed from the
/// same inputs compare and print identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
}

impl BuildEnv {
    pub fn new() -> Self {
        BuildEnv::default()
    }

    /// Captures the environment of the current process. Variables that are
    /// not valid unicode are left out.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.vars.insert(key.into(), value.into());
    }

    /// Sets `key` when there is a value and removes it otherwise.
    pub fn set_or_remove<K: Into<String>>(&mut self, key: K, value: Option<String>) {
        let key = key.into();
        match value {
            Some(value) => self.set(key, value),
            None => {
                self.vars.remove(&key);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replaces the environment of `command` with exactly these variables.
    pub fn apply(&self, command: &mut Command) {
        command.env_clear();
        command.envs(&self.vars);
    }

    /// The compiler recorded by composition, if any.
    pub fn compiler(&self) -> Option<Compiler> {
        self.get(HOMEBREW_CC).map(Compiler::from_name)
    }

    pub fn cccfg(&self) -> Cccfg {
        self.get(HOMEBREW_CCCFG).map(Cccfg::from).unwrap_or_default()
    }

    pub(crate) fn append_to_cccfg(&mut self, flag: Flag) {
        let mut cccfg = self.cccfg();
        cccfg.append(flag);
        self.set(HOMEBREW_CCCFG, cccfg.to_string());
    }

    pub(crate) fn append_to(&mut self, key: &str, value: &str) {
        let joined = match self.get(key) {
            Some(old) if !old.is_empty() => format!("{} {}", old, value),
            _ => value.to_string(),
        };
        self.set(key, joined);
    }

    /// Removes `MAKEFLAGS` so make runs a single job, returning the old value.
    ///
    /// This is for makefiles with race conditions.
    pub fn deparallelize(&mut self) -> Option<String> {
        self.remove(MAKEFLAGS)
    }

    /// Runs `action` with `MAKEFLAGS` removed and puts the old value back
    /// afterwards, even if `action` fails or panics.
    pub fn deparallelized<T, F>(&mut self, action: F) -> (Option<String>, T)
    where
        F: FnOnce(&mut BuildEnv) -> T,
    {
        let old = self.deparallelize();
        let mut guard = RestoreMakeflags {
            env: self,
            old: old.clone(),
        };
        let output = action(&mut *guard.env);
        drop(guard);
        (old, output)
    }
}

struct RestoreMakeflags<'a> {
    env: &'a mut BuildEnv,
    old: Option<String>,
}

impl Drop for RestoreMakeflags<'_> {
    fn drop(&mut self) {
        let old = self.old.take();
        self.env.set_or_remove(MAKEFLAGS, old);
    }
}

impl FromIterator<(String, String)> for BuildEnv {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        BuildEnv {
            vars: iter.into_iter().collect(),
        }
    }
}
