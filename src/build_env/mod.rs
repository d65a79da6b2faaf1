mod compiler;
mod flags;
mod paths;

use std::path::PathBuf;

pub use flags::OptimizationLevel;
pub use paths::{Category, ExtraPaths, PathHooks, SYSTEM_PATHS};

use crate::{
    arch::optimization_flags,
    cccfg::Cccfg,
    compiler::Compiler,
    dependency::DependencySet,
    env::{BuildEnv, HOMEBREW_ARCHFLAGS, HOMEBREW_CCCFG, HOMEBREW_OPTIMIZATION_LEVEL, MAKEFLAGS},
    error::Result,
    Event, Superenv,
};

/// Variables that let the calling shell leak into a build.
pub static SANITIZED_VARS: &[&str] = &[
    "CDPATH",
    "CLICOLOR_FORCE",
    "CPATH",
    "C_INCLUDE_PATH",
    "CPLUS_INCLUDE_PATH",
    "OBJC_INCLUDE_PATH",
    "CC",
    "CXX",
    "OBJC",
    "OBJCXX",
    "CPP",
    "MAKE",
    "LD",
    "LDSHARED",
    "CFLAGS",
    "CXXFLAGS",
    "OBJCFLAGS",
    "OBJCXXFLAGS",
    "LDFLAGS",
    "CPPFLAGS",
    "MACOSX_DEPLOYMENT_TARGET",
    "SDKROOT",
    "DEVELOPER_DIR",
    "CMAKE_PREFIX_PATH",
    "CMAKE_INCLUDE_PATH",
    "CMAKE_FRAMEWORK_PATH",
    "GOBIN",
    "GOPATH",
    "GOROOT",
    "PERL_MB_OPT",
    "PERL_MM_OPT",
    "LIBRARY_PATH",
    "LD_LIBRARY_PATH",
    "LD_PRELOAD",
    "LD_RUN_PATH",
    "GREP_OPTIONS",
];

/// Packages whose macros need a known m4.
static AUTOTOOLS: &[&str] = &["autoconf", "automake", "libtool"];

/// What is being built and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildRequest {
    pub compiler: Compiler,
    /// Where the package being built installs to.
    pub formula_prefix: Option<PathBuf>,
    /// Build a relocatable binary package for older machines.
    pub build_bottle: bool,
    /// Target CPU for a bottle. Defaults to the oldest the host supports.
    pub bottle_arch: Option<String>,
}

impl BuildRequest {
    pub fn new(compiler: Compiler) -> Self {
        BuildRequest {
            compiler,
            ..BuildRequest::default()
        }
    }

    pub fn formula_prefix<P: Into<PathBuf>>(mut self, prefix: P) -> Self {
        self.formula_prefix = Some(prefix.into());
        self
    }

    pub fn bottle(mut self, arch: Option<String>) -> Self {
        self.build_bottle = true;
        self.bottle_arch = arch;
        self
    }
}

impl Superenv {
    /// Turns `env` into an isolated build environment for `deps`.
    ///
    /// Composing the output again with the same inputs gives the same
    /// variables. On error nothing is returned, the caller's environment is
    /// left as it was.
    pub fn compose(
        &self,
        mut env: BuildEnv,
        deps: &DependencySet,
        request: &BuildRequest,
    ) -> Result<BuildEnv> {
        self.event(Event::ComposingEnvironment);
        let config = &self.config;

        reset(&mut env);
        self.set_compiler(&mut env, &request.compiler);
        env.set("HOMEBREW_ENV", "super");

        let jobs = self.make_jobs();
        if !env.contains(MAKEFLAGS) {
            env.set(MAKEFLAGS, format!("-j{}", jobs));
        }

        for category in [
            Category::Path,
            Category::PkgConfigPath,
            Category::PkgConfigLibdir,
        ] {
            self.set_path_list(&mut env, category, deps, request);
        }

        env.set(HOMEBREW_CCCFG, Cccfg::with_defaults().to_string());
        env.set(
            HOMEBREW_OPTIMIZATION_LEVEL,
            OptimizationLevel::default().to_string(),
        );
        env.set("HOMEBREW_BREW_FILE", config.brew_file.display().to_string());
        env.set("HOMEBREW_PREFIX", config.prefix.display().to_string());
        env.set("HOMEBREW_CELLAR", config.cellar.display().to_string());
        env.set("HOMEBREW_OPT", config.opt().display().to_string());
        env.set("HOMEBREW_TEMP", config.temp.display().to_string());

        let arch = self
            .host
            .effective_arch(request.build_bottle, request.bottle_arch.as_deref());
        let flags = optimization_flags(&arch)?;
        self.event(Event::UsingArchitecture(arch));
        env.set("HOMEBREW_OPTFLAGS", flags.optflags);
        env.set_or_remove("RUSTFLAGS", flags.rustflags());
        env.set(HOMEBREW_ARCHFLAGS, "");
        env.set("HOMEBREW_MAKE_JOBS", jobs.to_string());

        for category in [
            Category::CmakePrefixPath,
            Category::CmakeIncludePath,
            Category::CmakeLibraryPath,
            Category::CmakeFrameworkPath,
            Category::AclocalPath,
        ] {
            self.set_path_list(&mut env, category, deps, request);
        }

        if deps.contains_any(AUTOTOOLS) {
            let m4 = config.opt().join("m4/bin/m4");
            env.set("M4", m4.display().to_string());
        }

        for category in [
            Category::IsystemPaths,
            Category::IncludePaths,
            Category::LibraryPaths,
            Category::RpathPaths,
        ] {
            self.set_path_list(&mut env, category, deps, request);
        }

        env.set("HOMEBREW_DEPENDENCIES", deps.names());
        if let Some(prefix) = &request.formula_prefix {
            env.set("HOMEBREW_FORMULA_PREFIX", prefix.display().to_string());
        }

        Ok(env)
    }
}

fn reset(env: &mut BuildEnv) {
    for var in SANITIZED_VARS {
        env.remove(var);
    }
    // Set by configure scripts and breaks nested ones.
    env.remove("as_nl");
}

#[cfg(test)]
mod test {
    use std::{
        fs::create_dir_all,
        path::{Path, PathBuf},
    };

    use tempfile::TempDir;

    use crate::{
        arch::Host,
        callback::test::Recorder,
        config::Config,
        dependency::Dependency,
        error::Error,
        LogLevel, LogMessage,
    };

    use super::*;

    struct Fixture {
        tmp: TempDir,
        superenv: Superenv,
        recorder: Recorder,
    }

    impl Fixture {
        fn new() -> Fixture {
            let tmp = tempfile::tempdir().unwrap();
            let prefix = tmp.path().join("prefix");
            let mut config = Config::with_prefix(&prefix);
            config.temp = tmp.path().join("tmp");
            for dir in [
                config.shims_dir.clone(),
                prefix.join("include"),
                prefix.join("lib"),
                prefix.join("share/aclocal"),
            ] {
                create_dir_all(dir).unwrap();
            }

            let recorder = Recorder::default();
            let superenv = Superenv::from_config(config)
                .host(Host {
                    arch: "x86_64".into(),
                    cores: 6,
                })
                .callbacks(recorder.clone());

            Fixture {
                tmp,
                superenv,
                recorder,
            }
        }

        fn prefix(&self) -> &Path {
            &self.superenv.config.prefix
        }

        /// An installed package with the given subdirectories created.
        fn dep(&self, name: &str, dirs: &[&str]) -> Dependency {
            let dep = Dependency::installed(name, self.prefix());
            create_dir_all(dep.prefix()).unwrap();
            for dir in dirs {
                create_dir_all(dep.prefix().join(dir)).unwrap();
            }
            dep
        }

        fn compose(&self, deps: &DependencySet, request: &BuildRequest) -> BuildEnv {
            self.superenv
                .compose(BuildEnv::new(), deps, request)
                .unwrap()
        }
    }

    fn split(value: Option<&str>) -> Vec<PathBuf> {
        value
            .unwrap_or_default()
            .split(':')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    #[test]
    fn shims_come_first() {
        let fixture = Fixture::new();
        let a = fixture.dep("a", &["bin"]);
        let b = fixture.dep("b", &[]);
        let deps = DependencySet::new(vec![a.clone(), b.clone()]);

        let env = fixture.compose(&deps, &BuildRequest::new(Compiler::Clang));
        let path = split(env.get("PATH"));

        assert_eq!(path[0], fixture.superenv.config.shims_dir);
        assert_eq!(path[1], a.bin());
        assert!(!path.contains(&b.bin()));
        if let Some(pos) = path.iter().position(|p| p == Path::new("/usr/bin")) {
            assert!(pos > 1);
        }
    }

    #[test]
    fn keg_only_paths() {
        let fixture = Fixture::new();
        let plain = fixture.dep("plain", &["include", "lib", "share/aclocal"]);
        let keg = fixture
            .dep("keg", &["include", "lib", "share/aclocal"])
            .keg_only();
        let deps = DependencySet::new(vec![plain.clone(), keg.clone()]);
        let prefix = fixture.prefix().to_path_buf();

        let env = fixture.compose(&deps, &BuildRequest::default());

        assert_eq!(split(env.get("HOMEBREW_INCLUDE_PATHS")), [keg.include()]);
        assert_eq!(
            split(env.get("HOMEBREW_LIBRARY_PATHS")),
            [keg.lib(), prefix.join("lib")]
        );
        assert_eq!(
            split(env.get("CMAKE_PREFIX_PATH")),
            [keg.prefix().to_path_buf(), prefix.clone()]
        );
        assert_eq!(
            split(env.get("ACLOCAL_PATH")),
            [keg.share().join("aclocal"), prefix.join("share/aclocal")]
        );
        assert_eq!(
            split(env.get("HOMEBREW_ISYSTEM_PATHS")),
            [prefix.join("include")]
        );
    }

    #[test]
    fn pkg_config_paths() {
        let fixture = Fixture::new();
        let a = fixture.dep("a", &["lib/pkgconfig", "share/pkgconfig"]);
        let b = fixture.dep("b", &["lib/pkgconfig"]);
        let deps = DependencySet::new(vec![a.clone(), b.clone()]);

        let env = fixture.compose(&deps, &BuildRequest::default());

        assert_eq!(
            split(env.get("PKG_CONFIG_PATH")),
            [
                a.lib().join("pkgconfig"),
                b.lib().join("pkgconfig"),
                a.share().join("pkgconfig")
            ]
        );
        assert_eq!(env.get("PKG_CONFIG_LIBDIR"), Some(""));
    }

    #[test]
    fn empty_lists_are_unset() {
        let fixture = Fixture::new();
        let mut env = BuildEnv::new();
        env.set("CMAKE_INCLUDE_PATH", "/somewhere");
        env.set("HOMEBREW_INCLUDE_PATHS", "/elsewhere");

        let env = fixture
            .superenv
            .compose(env, &DependencySet::default(), &BuildRequest::default())
            .unwrap();

        assert!(!env.contains("CMAKE_INCLUDE_PATH"));
        assert!(!env.contains("HOMEBREW_INCLUDE_PATHS"));
        assert!(!env.contains("PKG_CONFIG_PATH"));
        assert_eq!(env.get("HOMEBREW_DEPENDENCIES"), Some(""));
    }

    #[test]
    fn makeflags() {
        let fixture = Fixture::new();
        let deps = DependencySet::default();
        let request = BuildRequest::default();

        let env = fixture.compose(&deps, &request);
        assert_eq!(env.get(MAKEFLAGS), Some("-j6"));
        assert_eq!(env.get("HOMEBREW_MAKE_JOBS"), Some("6"));

        let mut existing = BuildEnv::new();
        existing.set(MAKEFLAGS, "-j2 -k");
        let env = fixture.superenv.compose(existing, &deps, &request).unwrap();
        assert_eq!(env.get(MAKEFLAGS), Some("-j2 -k"));
    }

    #[test]
    fn resets_leaky_variables() {
        let fixture = Fixture::new();
        let mut env = BuildEnv::new();
        env.set("CFLAGS", "-O0");
        env.set("LD_PRELOAD", "/lib/hack.so");
        env.set("as_nl", "\n");
        env.set("HOME", "/home/me");

        let env = fixture
            .superenv
            .compose(env, &DependencySet::default(), &BuildRequest::default())
            .unwrap();

        assert!(!env.contains("CFLAGS"));
        assert!(!env.contains("LD_PRELOAD"));
        assert!(!env.contains("as_nl"));
        assert_eq!(env.get("HOME"), Some("/home/me"));
        assert_eq!(env.get("HOMEBREW_ENV"), Some("super"));
    }

    #[test]
    fn flags_and_locations() {
        let fixture = Fixture::new();
        let request = BuildRequest::new(Compiler::Gcc(Some("13".into())))
            .formula_prefix("/opt/homebrew/Cellar/foo/1.0");
        let env = fixture.compose(&DependencySet::default(), &request);
        let config = &fixture.superenv.config;

        assert_eq!(env.get(HOMEBREW_CCCFG), Some("sa"));
        assert_eq!(env.get(HOMEBREW_OPTIMIZATION_LEVEL), Some("Os"));
        assert_eq!(env.get(HOMEBREW_ARCHFLAGS), Some(""));
        assert_eq!(env.get("HOMEBREW_OPTFLAGS"), Some("-march=native"));
        assert_eq!(
            env.get("RUSTFLAGS"),
            Some("--codegen target-cpu=native")
        );
        assert_eq!(env.get("CC"), Some("gcc-13"));
        assert_eq!(env.get("CXX"), Some("g++-13"));
        assert_eq!(
            env.get("HOMEBREW_CELLAR"),
            Some(config.cellar.to_str().unwrap())
        );
        assert_eq!(
            env.get("HOMEBREW_TEMP"),
            Some(fixture.tmp.path().join("tmp").to_str().unwrap())
        );
        assert_eq!(
            env.get("HOMEBREW_FORMULA_PREFIX"),
            Some("/opt/homebrew/Cellar/foo/1.0")
        );
        assert_eq!(
            fixture.recorder.events.borrow().as_slice(),
            [
                Event::ComposingEnvironment,
                Event::UsingCompiler("gcc-13".into(), "g++-13".into()),
                Event::UsingArchitecture("native".into()),
            ]
        );
    }

    #[test]
    fn bottle_arch() {
        let fixture = Fixture::new();
        let deps = DependencySet::default();

        let env = fixture.compose(&deps, &BuildRequest::default().bottle(None));
        assert_eq!(env.get("HOMEBREW_OPTFLAGS"), Some("-march=core2"));

        let env = fixture.compose(
            &deps,
            &BuildRequest::default().bottle(Some("armv8".into())),
        );
        assert_eq!(env.get("HOMEBREW_OPTFLAGS"), Some("-march=armv8-a"));
        assert!(!env.contains("RUSTFLAGS"));
    }

    #[test]
    fn unknown_bottle_arch() {
        let fixture = Fixture::new();
        let mut env = BuildEnv::new();
        env.set("CFLAGS", "-O0");

        let err = fixture
            .superenv
            .compose(
                env,
                &DependencySet::default(),
                &BuildRequest::default().bottle(Some("pentium".into())),
            )
            .unwrap_err();

        match err {
            Error::Architecture(e) => assert_eq!(e.arch, "pentium"),
            other => panic!("expected architecture error, got {:?}", other),
        }
    }

    #[test]
    fn composing_twice_is_stable() {
        let fixture = Fixture::new();
        let deps = DependencySet::new(vec![
            fixture.dep("autoconf", &["bin", "share/aclocal"]).keg_only(),
            fixture.dep("zlib", &["lib", "include"]).run_time(),
        ]);
        let request = BuildRequest::default().formula_prefix(fixture.tmp.path());

        let once = fixture.compose(&deps, &request);
        let twice = fixture
            .superenv
            .compose(once.clone(), &deps, &request)
            .unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn m4_for_autotools() {
        let fixture = Fixture::new();
        let opt = fixture.superenv.config.opt();

        let env = fixture.compose(
            &DependencySet::new(vec![fixture.dep("libtool", &[])]),
            &BuildRequest::default(),
        );
        assert_eq!(
            env.get("M4"),
            Some(opt.join("m4/bin/m4").to_str().unwrap())
        );

        let env = fixture.compose(
            &DependencySet::new(vec![fixture.dep("cmake", &[])]),
            &BuildRequest::default(),
        );
        assert!(!env.contains("M4"));
    }

    #[test]
    fn rpath_paths() {
        let fixture = Fixture::new();
        let formula = fixture.tmp.path().join("Cellar/foo/1.0");
        create_dir_all(formula.join("lib")).unwrap();
        let run = fixture.dep("run", &["lib"]).run_time();
        let build = fixture.dep("build", &["lib"]);
        let deps = DependencySet::new(vec![build.clone(), run.clone()]);

        let env = fixture.compose(&deps, &BuildRequest::default().formula_prefix(&formula));

        assert_eq!(
            split(env.get("HOMEBREW_RPATH_PATHS")),
            [formula.join("lib"), fixture.prefix().join("lib"), run.lib()]
        );
        assert_eq!(env.get("HOMEBREW_DEPENDENCIES"), Some("build,run"));
    }

    #[test]
    fn formula_lib_not_yet_built() {
        let fixture = Fixture::new();
        let formula = fixture.tmp.path().join("Cellar/foo/1.0");
        let run = fixture.dep("run", &["lib"]).run_time();

        let env = fixture.compose(
            &DependencySet::new(vec![run.clone()]),
            &BuildRequest::default().formula_prefix(&formula),
        );

        assert_eq!(
            split(env.get("HOMEBREW_RPATH_PATHS")),
            [fixture.prefix().join("lib"), run.lib()]
        );
        assert_eq!(
            env.get("HOMEBREW_FORMULA_PREFIX"),
            Some(formula.to_str().unwrap())
        );
    }

    #[test]
    fn gcc_toolchain_goes_last() {
        let fixture = Fixture::new();
        let gcc = fixture.dep("gcc@13", &["bin"]);
        let request = BuildRequest::new(Compiler::Gcc(Some("13".into())));

        let env = fixture.compose(&DependencySet::default(), &request);
        let path = split(env.get("PATH"));
        assert_eq!(path.last(), Some(&gcc.bin()));
        assert!(fixture.recorder.logs.borrow().is_empty());
    }

    #[test]
    fn missing_gcc_toolchain_is_skipped() {
        let fixture = Fixture::new();
        let request = BuildRequest::new(Compiler::Gcc(Some("12".into())));

        let env = fixture.compose(&DependencySet::default(), &request);
        let path = split(env.get("PATH"));
        assert!(!path.iter().any(|p| p.ends_with("gcc@12/bin")));
        assert_eq!(
            fixture.recorder.logs.borrow().as_slice(),
            [(
                LogLevel::Debug,
                LogMessage::ToolchainUnavailable("gcc@12".into())
            )]
        );
    }

    #[derive(Debug)]
    struct X11(PathBuf);

    impl PathHooks for X11 {
        fn extra_paths(&self, category: Category) -> Vec<PathBuf> {
            match category {
                Category::Path => vec![self.0.join("bin")],
                Category::PkgConfigLibdir => vec![self.0.join("lib/pkgconfig")],
                Category::IncludePaths => vec![self.0.join("include")],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn hooks_extend_lists() {
        let fixture = Fixture::new();
        let x11 = fixture.tmp.path().join("X11");
        for dir in ["bin", "lib/pkgconfig", "include"] {
            create_dir_all(x11.join(dir)).unwrap();
        }
        let a = fixture.dep("a", &["bin"]);
        let superenv = Superenv::from_config(fixture.superenv.config.clone())
            .host(fixture.superenv.host.clone())
            .hooks(X11(x11.clone()));

        let env = superenv
            .compose(
                BuildEnv::new(),
                &DependencySet::new(vec![a.clone()]),
                &BuildRequest::default(),
            )
            .unwrap();

        let path = split(env.get("PATH"));
        assert_eq!(&path[1..3], [a.bin(), x11.join("bin")]);
        assert_eq!(
            split(env.get("PKG_CONFIG_LIBDIR")),
            [x11.join("lib/pkgconfig")]
        );
        // Include paths only ever hold keg-only dependencies.
        assert!(!env.contains("HOMEBREW_INCLUDE_PATHS"));
    }

    /// Hands out `<root>/<category>` for every category, and a dependency's
    /// `bin` again for `PATH`.
    #[derive(Debug)]
    struct Everywhere {
        root: PathBuf,
        repeat: PathBuf,
    }

    impl Everywhere {
        fn dir(&self, category: Category) -> PathBuf {
            self.root.join(category.variable())
        }
    }

    impl PathHooks for Everywhere {
        fn extra_paths(&self, category: Category) -> Vec<PathBuf> {
            match category {
                Category::Path => vec![self.repeat.clone(), self.dir(category)],
                _ => vec![self.dir(category)],
            }
        }
    }

    #[test]
    fn hooks_in_every_category() {
        let fixture = Fixture::new();
        let hooks = fixture.tmp.path().join("hooks");
        for category in Category::ALL {
            create_dir_all(hooks.join(category.variable())).unwrap();
        }
        let a = fixture.dep("a", &["bin", "Frameworks"]);
        let keg = fixture
            .dep("keg", &["Frameworks", "share/aclocal"])
            .keg_only();
        let everywhere = Everywhere {
            root: hooks.clone(),
            repeat: a.bin(),
        };
        let dir = |category: Category| hooks.join(category.variable());
        let prefix = fixture.prefix().to_path_buf();
        let expected_path = [
            fixture.superenv.config.shims_dir.clone(),
            a.bin(),
            dir(Category::Path),
        ];
        let expected = [
            (
                Category::CmakeFrameworkPath,
                vec![
                    a.frameworks(),
                    keg.frameworks(),
                    dir(Category::CmakeFrameworkPath),
                ],
            ),
            (
                Category::CmakeIncludePath,
                vec![dir(Category::CmakeIncludePath)],
            ),
            (
                Category::CmakeLibraryPath,
                vec![dir(Category::CmakeLibraryPath)],
            ),
            (
                Category::AclocalPath,
                vec![
                    keg.share().join("aclocal"),
                    prefix.join("share/aclocal"),
                    dir(Category::AclocalPath),
                ],
            ),
            (
                Category::IsystemPaths,
                vec![prefix.join("include"), dir(Category::IsystemPaths)],
            ),
            (
                Category::LibraryPaths,
                vec![prefix.join("lib"), dir(Category::LibraryPaths)],
            ),
            (
                Category::PkgConfigLibdir,
                vec![dir(Category::PkgConfigLibdir)],
            ),
        ];

        let superenv = Superenv::from_config(fixture.superenv.config.clone())
            .host(fixture.superenv.host.clone())
            .hooks(everywhere);
        let deps = DependencySet::new(vec![a.clone(), keg.clone()]);
        let env = superenv
            .compose(BuildEnv::new(), &deps, &BuildRequest::new(Compiler::Clang))
            .unwrap();

        let path = split(env.get("PATH"));
        assert_eq!(&path[..3], expected_path);
        assert_eq!(path.iter().filter(|p| **p == a.bin()).count(), 1);

        for (category, paths) in expected {
            assert_eq!(split(env.get(category.variable())), paths, "{:?}", category);
        }

        // Categories without hooks never see the hook directories.
        for category in [
            Category::PkgConfigPath,
            Category::CmakePrefixPath,
            Category::IncludePaths,
            Category::RpathPaths,
        ] {
            assert!(!split(env.get(category.variable())).contains(&dir(category)));
        }
    }

    #[test]
    fn config_extra_paths() {
        let mut fixture = Fixture::new();
        let extra = fixture.tmp.path().join("extra/lib");
        create_dir_all(&extra).unwrap();
        fixture
            .superenv
            .config
            .extra_paths
            .set(Category::LibraryPaths, vec![extra.clone()]);

        let env = fixture.compose(&DependencySet::default(), &BuildRequest::default());
        assert_eq!(
            split(env.get("HOMEBREW_LIBRARY_PATHS")),
            [fixture.prefix().join("lib"), extra]
        );
    }
}
