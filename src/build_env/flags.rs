use std::fmt::Display;

use crate::{
    arch::{arch_flags, UNIVERSAL_ARCHS},
    cccfg::Flag,
    env::{BuildEnv, HOMEBREW_ARCHFLAGS, HOMEBREW_OPTIMIZATION_LEVEL},
    Deprecation, LogLevel, LogMessage, Superenv,
};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum OptimizationLevel {
    O3,
    O2,
    O1,
    O0,
    #[default]
    Os,
}

impl Display for OptimizationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OptimizationLevel::O3 => "O3",
            OptimizationLevel::O2 => "O2",
            OptimizationLevel::O1 => "O1",
            OptimizationLevel::O0 => "O0",
            OptimizationLevel::Os => "Os",
        };
        f.write_str(s)
    }
}

// Requests a build makes of an already composed environment. Most of these
// only append a flag for the shims to act on.
impl Superenv {
    /// Lets the shims rewrite compiler arguments they would normally pass on.
    pub fn refurbish_args(&self, env: &mut BuildEnv) {
        env.append_to_cccfg(Flag::RefurbishArgs);
    }

    /// Builds with C++11. Under clang this also selects libc++.
    pub fn cxx11(&self, env: &mut BuildEnv) {
        env.append_to_cccfg(Flag::Cxx11);
        if env.compiler().is_some_and(|c| c.is_clang()) {
            env.append_to_cccfg(Flag::Libcxx);
        }
    }

    pub fn libcxx(&self, env: &mut BuildEnv) {
        self.stdlib(env, Flag::Libcxx);
    }

    pub fn libstdcxx(&self, env: &mut BuildEnv) {
        self.deprecated(Deprecation::Libstdcxx);
        self.stdlib(env, Flag::Libstdcxx);
    }

    fn stdlib(&self, env: &mut BuildEnv, flag: Flag) {
        match env.compiler() {
            Some(compiler) if compiler.is_clang() => env.append_to_cccfg(flag),
            compiler => {
                let cc = compiler.map(|c| c.cc()).unwrap_or_default();
                self.log(LogLevel::Debug, LogMessage::StdlibNeedsClang(cc));
            }
        }
    }

    /// Stops the shims from stripping `-march` and friends.
    pub fn permit_arch_flags(&self, env: &mut BuildEnv) {
        env.append_to_cccfg(Flag::PermitArchFlags);
    }

    pub fn no_weak_imports(&self, env: &mut BuildEnv) {
        env.append_to_cccfg(Flag::NoWeakImports);
    }

    pub fn set_optimization_level(&self, env: &mut BuildEnv, level: OptimizationLevel) {
        self.deprecated(Deprecation::OptimizationLevel(level));
        env.set(HOMEBREW_OPTIMIZATION_LEVEL, level.to_string());
    }

    pub fn universal_binary(&self, env: &mut BuildEnv) {
        self.deprecated(Deprecation::UniversalBinary);
        env.set(HOMEBREW_ARCHFLAGS, arch_flags(UNIVERSAL_ARCHS));
    }

    pub fn m32(&self, env: &mut BuildEnv) {
        self.deprecated(Deprecation::M32);
        env.append_to(HOMEBREW_ARCHFLAGS, "-m32");
    }

    pub fn m64(&self, env: &mut BuildEnv) {
        self.deprecated(Deprecation::M64);
        env.append_to(HOMEBREW_ARCHFLAGS, "-m64");
    }
}
