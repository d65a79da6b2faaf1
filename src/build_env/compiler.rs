use crate::{
    compiler::Compiler,
    env::{BuildEnv, HOMEBREW_CC, HOMEBREW_CXX},
    Event, Superenv,
};

impl Superenv {
    /// Points the C, C++ and Objective-C compiler variables at `compiler`.
    ///
    /// The shims read `HOMEBREW_CC` and `HOMEBREW_CXX` to pick the real tools.
    pub fn set_compiler(&self, env: &mut BuildEnv, compiler: &Compiler) {
        let cc = compiler.cc();
        let cxx = compiler.cxx();
        self.event(Event::UsingCompiler(cc.clone(), cxx.clone()));

        for key in [HOMEBREW_CC, "CC", "OBJC"] {
            env.set(key, cc.as_str());
        }
        for key in [HOMEBREW_CXX, "CXX", "OBJCXX"] {
            env.set(key, cxx.as_str());
        }
    }
}
