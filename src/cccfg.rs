//! The flag string handed to the compiler shims in `HOMEBREW_CCCFG`.
//!
//! Each character switches on one behaviour in the shim. Characters are only
//! ever added, and adding one that is already present does nothing.

use std::fmt::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Rewrite arguments the shim would otherwise pass through untouched.
    RefurbishArgs,
    Cxx11,
    Libcxx,
    Libstdcxx,
    /// Keep `-arch`, `-m32` and `-m64` instead of stripping them.
    PermitArchFlags,
    NoWeakImports,
    Sed,
    AprConfig,
}

impl Flag {
    pub fn as_char(self) -> char {
        match self {
            Flag::RefurbishArgs => 'O',
            Flag::Cxx11 => 'x',
            Flag::Libcxx => 'g',
            Flag::Libstdcxx => 'h',
            Flag::PermitArchFlags => 'K',
            Flag::NoWeakImports => 'w',
            Flag::Sed => 's',
            Flag::AprConfig => 'a',
        }
    }
}

impl From<Flag> for char {
    fn from(value: Flag) -> Self {
        value.as_char()
    }
}

/// Compatibility fixes every environment starts with.
pub const DEFAULT_FLAGS: [Flag; 2] = [Flag::Sed, Flag::AprConfig];

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cccfg(String);

impl Cccfg {
    pub fn new() -> Self {
        Cccfg::default()
    }

    pub fn with_defaults() -> Self {
        let mut cccfg = Cccfg::new();
        for flag in DEFAULT_FLAGS {
            cccfg.append(flag);
        }
        cccfg
    }

    pub fn append<C: Into<char>>(&mut self, flag: C) {
        let flag = flag.into();
        if !self.0.contains(flag) {
            self.0.push(flag);
        }
    }

    pub fn contains<C: Into<char>>(&self, flag: C) -> bool {
        self.0.contains(flag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Cccfg {
    fn from(value: &str) -> Self {
        let mut cccfg = Cccfg::new();
        value.chars().for_each(|c| cccfg.append(c));
        cccfg
    }
}

impl Display for Cccfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
