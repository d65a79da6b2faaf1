use std::{collections::BTreeMap, fmt::Debug, path::PathBuf};

use crate::{
    compiler::Compiler,
    dependency::{Dependency, DependencySet},
    env::BuildEnv,
    path::PathList,
    BuildRequest, LogLevel, LogMessage, Superenv,
};

pub static SYSTEM_PATHS: &[&str] = &["/usr/bin", "/bin", "/usr/sbin", "/sbin"];

/// The search path variables a build environment carries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Path,
    PkgConfigPath,
    PkgConfigLibdir,
    CmakePrefixPath,
    CmakeFrameworkPath,
    CmakeIncludePath,
    CmakeLibraryPath,
    AclocalPath,
    IsystemPaths,
    IncludePaths,
    LibraryPaths,
    RpathPaths,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Path,
        Category::PkgConfigPath,
        Category::PkgConfigLibdir,
        Category::CmakePrefixPath,
        Category::CmakeFrameworkPath,
        Category::CmakeIncludePath,
        Category::CmakeLibraryPath,
        Category::AclocalPath,
        Category::IsystemPaths,
        Category::IncludePaths,
        Category::LibraryPaths,
        Category::RpathPaths,
    ];

    pub fn variable(self) -> &'static str {
        match self {
            Category::Path => "PATH",
            Category::PkgConfigPath => "PKG_CONFIG_PATH",
            Category::PkgConfigLibdir => "PKG_CONFIG_LIBDIR",
            Category::CmakePrefixPath => "CMAKE_PREFIX_PATH",
            Category::CmakeFrameworkPath => "CMAKE_FRAMEWORK_PATH",
            Category::CmakeIncludePath => "CMAKE_INCLUDE_PATH",
            Category::CmakeLibraryPath => "CMAKE_LIBRARY_PATH",
            Category::AclocalPath => "ACLOCAL_PATH",
            Category::IsystemPaths => "HOMEBREW_ISYSTEM_PATHS",
            Category::IncludePaths => "HOMEBREW_INCLUDE_PATHS",
            Category::LibraryPaths => "HOMEBREW_LIBRARY_PATHS",
            Category::RpathPaths => "HOMEBREW_RPATH_PATHS",
        }
    }

    /// The config array feeding this category's hook, if it has one.
    pub fn config_key(self) -> Option<&'static str> {
        match self {
            Category::Path => Some("EXTRA_PATHS"),
            Category::PkgConfigLibdir => Some("EXTRA_PKG_CONFIG_PATHS"),
            Category::CmakeFrameworkPath => Some("EXTRA_CMAKE_FRAMEWORKS_PATHS"),
            Category::CmakeIncludePath => Some("EXTRA_CMAKE_INCLUDE_PATHS"),
            Category::CmakeLibraryPath => Some("EXTRA_CMAKE_LIBRARY_PATHS"),
            Category::AclocalPath => Some("EXTRA_ACLOCAL_PATHS"),
            Category::IsystemPaths => Some("EXTRA_ISYSTEM_PATHS"),
            Category::LibraryPaths => Some("EXTRA_LIBRARY_PATHS"),
            Category::PkgConfigPath
            | Category::CmakePrefixPath
            | Category::IncludePaths
            | Category::RpathPaths => None,
        }
    }
}

/// Extra directories for platforms and setups to add to a category.
///
/// Only categories with a [`config_key`](`Category::config_key`) ask for them.
pub trait PathHooks: Debug {
    fn extra_paths(&self, _category: Category) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Hook paths read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraPaths {
    paths: BTreeMap<Category, Vec<PathBuf>>,
}

impl ExtraPaths {
    pub fn get(&self, category: Category) -> &[PathBuf] {
        self.paths
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn set(&mut self, category: Category, paths: Vec<PathBuf>) {
        self.paths.insert(category, paths);
    }
}

impl PathHooks for ExtraPaths {
    fn extra_paths(&self, category: Category) -> Vec<PathBuf> {
        self.get(category).to_vec()
    }
}

impl Superenv {
    /// Builds the search path for `category`.
    ///
    /// Candidates are gathered in priority order and then filtered down to
    /// directories that exist, keeping the first occurrence of each.
    pub fn path_list(
        &self,
        category: Category,
        deps: &DependencySet,
        request: &BuildRequest,
    ) -> PathList {
        let config = &self.config;
        let prefix = &config.prefix;
        let hooks = self.path_hooks();
        let mut paths = Vec::new();

        match category {
            Category::Path => {
                paths.push(config.shims_dir.clone());
                paths.extend(deps.all().map(Dependency::bin));
                paths.extend(hooks.extra_paths(category));
                paths.extend(SYSTEM_PATHS.iter().map(PathBuf::from));
                paths.extend(self.toolchain(deps, &request.compiler).map(|d| d.bin()));
            }
            Category::PkgConfigPath => {
                paths.extend(deps.all().map(|d| d.lib().join("pkgconfig")));
                paths.extend(deps.all().map(|d| d.share().join("pkgconfig")));
            }
            Category::PkgConfigLibdir => {
                paths.extend(hooks.extra_paths(category));
            }
            Category::CmakePrefixPath => {
                paths.extend(deps.keg_only().map(|d| d.prefix().to_path_buf()));
                paths.push(prefix.clone());
            }
            Category::CmakeFrameworkPath => {
                paths.extend(deps.all().map(Dependency::frameworks));
                paths.extend(hooks.extra_paths(category));
            }
            Category::CmakeIncludePath | Category::CmakeLibraryPath => {
                paths.extend(hooks.extra_paths(category));
            }
            Category::AclocalPath => {
                paths.extend(deps.keg_only().map(|d| d.share().join("aclocal")));
                paths.push(prefix.join("share/aclocal"));
                paths.extend(hooks.extra_paths(category));
            }
            Category::IsystemPaths => {
                paths.push(prefix.join("include"));
                paths.extend(hooks.extra_paths(category));
            }
            Category::IncludePaths => {
                paths.extend(deps.keg_only().map(Dependency::include));
            }
            Category::LibraryPaths => {
                paths.extend(deps.keg_only().map(Dependency::lib));
                paths.push(prefix.join("lib"));
                paths.extend(hooks.extra_paths(category));
            }
            Category::RpathPaths => {
                paths.extend(request.formula_prefix.as_ref().map(|p| p.join("lib")));
                paths.push(prefix.join("lib"));
                paths.extend(deps.run_time().map(Dependency::lib));
            }
        }

        PathList::existing(paths)
    }

    /// Writes the path list for `category` into `env`.
    ///
    /// An empty list removes the variable, except for `PKG_CONFIG_LIBDIR` which
    /// is set empty so pkg-config does not fall back to its built in directories.
    pub(crate) fn set_path_list(
        &self,
        env: &mut BuildEnv,
        category: Category,
        deps: &DependencySet,
        request: &BuildRequest,
    ) {
        let list = self.path_list(category, deps, request);
        match category {
            Category::PkgConfigLibdir => env.set(category.variable(), list.to_string()),
            _ => env.set_or_remove(category.variable(), list.value()),
        }
    }

    /// The package providing `compiler`, looked up among the dependencies and
    /// then among installed packages.
    fn toolchain(&self, deps: &DependencySet, compiler: &Compiler) -> Option<Dependency> {
        let package = compiler.toolchain_package()?;

        if let Some(dep) = deps.find(&package) {
            return Some(dep.clone());
        }

        let installed = Dependency::installed(package.as_str(), &self.config.prefix);
        if installed.prefix().is_dir() {
            Some(installed)
        } else {
            self.log(LogLevel::Debug, LogMessage::ToolchainUnavailable(package));
            None
        }
    }
}
