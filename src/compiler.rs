use std::{convert::Infallible, fmt::Display, str::FromStr, sync::OnceLock};

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Compiler {
    Clang,
    /// gcc, optionally a numbered release such as `gcc-13`.
    Gcc(Option<String>),
    Other(String),
}

fn gcc_pattern() -> &'static Regex {
    static GCC: OnceLock<Regex> = OnceLock::new();
    GCC.get_or_init(|| Regex::new(r"^gcc(?:-(\d+(?:\.\d+)*))?$").expect("valid gcc pattern"))
}

impl Compiler {
    pub fn from_name(name: &str) -> Compiler {
        if name == "clang" {
            return Compiler::Clang;
        }
        match gcc_pattern().captures(name) {
            Some(caps) => Compiler::Gcc(caps.get(1).map(|v| v.as_str().to_string())),
            None => Compiler::Other(name.to_string()),
        }
    }

    /// The executable name of the C compiler.
    pub fn cc(&self) -> String {
        match self {
            Compiler::Clang => "clang".to_string(),
            Compiler::Gcc(None) => "gcc".to_string(),
            Compiler::Gcc(Some(version)) => format!("gcc-{}", version),
            Compiler::Other(name) => name.clone(),
        }
    }

    pub fn cxx(&self) -> String {
        cxx_name(&self.cc())
    }

    pub fn is_clang(&self) -> bool {
        matches!(self, Compiler::Clang)
    }

    /// The package that provides this compiler, when it is one we ship.
    pub fn toolchain_package(&self) -> Option<String> {
        match self {
            Compiler::Gcc(None) => Some("gcc".to_string()),
            Compiler::Gcc(Some(version)) => Some(format!("gcc@{}", version)),
            _ => None,
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        if cfg!(target_vendor = "apple") {
            Compiler::Clang
        } else {
            Compiler::Gcc(None)
        }
    }
}

impl FromStr for Compiler {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Compiler::from_name(s))
    }
}

impl Display for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.cc())
    }
}

/// Derives the C++ compiler name from a C compiler name, keeping any version suffix.
///
/// Names from neither the gcc nor the clang family are returned unchanged.
pub fn cxx_name(cc: &str) -> String {
    cc.replace("gcc", "g++").replace("clang", "clang++")
}
