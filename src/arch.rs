use crate::error::{ArchitectureError, Result};

/// Compiler flags for one CPU target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ArchFlags {
    pub name: &'static str,
    pub optflags: &'static str,
    /// Value for rustc's `target-cpu`, when rustc knows this target.
    pub rust_cpu: Option<&'static str>,
}

impl ArchFlags {
    pub fn rustflags(&self) -> Option<String> {
        self.rust_cpu
            .map(|cpu| format!("--codegen target-cpu={}", cpu))
    }
}

pub static OPTIMIZATION_FLAGS: &[ArchFlags] = &[
    ArchFlags {
        name: "native",
        optflags: "-march=native",
        rust_cpu: Some("native"),
    },
    ArchFlags {
        name: "ivybridge",
        optflags: "-march=ivybridge",
        rust_cpu: Some("ivybridge"),
    },
    ArchFlags {
        name: "sandybridge",
        optflags: "-march=sandybridge",
        rust_cpu: Some("sandybridge"),
    },
    ArchFlags {
        name: "nehalem",
        optflags: "-march=nehalem",
        rust_cpu: Some("nehalem"),
    },
    ArchFlags {
        name: "core2",
        optflags: "-march=core2",
        rust_cpu: Some("core2"),
    },
    ArchFlags {
        name: "core",
        optflags: "-march=prescott",
        rust_cpu: Some("prescott"),
    },
    ArchFlags {
        name: "arm_vortex_tempest",
        optflags: "",
        rust_cpu: None,
    },
    ArchFlags {
        name: "armv6",
        optflags: "-march=armv6",
        rust_cpu: None,
    },
    ArchFlags {
        name: "armv8",
        optflags: "-march=armv8-a",
        rust_cpu: None,
    },
    ArchFlags {
        name: "ppc64",
        optflags: "-mcpu=powerpc64",
        rust_cpu: None,
    },
    ArchFlags {
        name: "ppc64le",
        optflags: "-mcpu=powerpc64le",
        rust_cpu: None,
    },
];

pub static UNIVERSAL_ARCHS: &[&str] = &["i386", "x86_64"];

pub fn optimization_flags(arch: &str) -> Result<&'static ArchFlags> {
    OPTIMIZATION_FLAGS
        .iter()
        .find(|flags| flags.name == arch)
        .ok_or_else(|| {
            ArchitectureError {
                arch: arch.to_string(),
            }
            .into()
        })
}

pub fn arch_flags(archs: &[&str]) -> String {
    archs
        .iter()
        .map(|arch| format!("-arch {}", arch))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The machine the build runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// As reported by [`std::env::consts::ARCH`].
    pub arch: String,
    pub cores: usize,
}

impl Default for Host {
    fn default() -> Self {
        Host::detect()
    }
}

impl Host {
    pub fn detect() -> Host {
        Host {
            arch: std::env::consts::ARCH.to_string(),
            cores: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }

    /// The oldest CPU bottles for this host are built for.
    pub fn oldest_cpu(&self) -> &str {
        match self.arch.as_str() {
            "x86_64" => "core2",
            "aarch64" if cfg!(target_vendor = "apple") => "arm_vortex_tempest",
            "aarch64" => "armv8",
            "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
            "powerpc64" => "ppc64",
            arch => arch,
        }
    }

    pub fn effective_arch(&self, build_bottle: bool, bottle_arch: Option<&str>) -> String {
        match (build_bottle, bottle_arch) {
            (true, Some(arch)) => arch.to_string(),
            (true, None) => self.oldest_cpu().to_string(),
            (false, _) => "native".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::error::Error;

    use super::*;

    fn host(arch: &str) -> Host {
        Host {
            arch: arch.to_string(),
            cores: 4,
        }
    }

    #[test]
    fn known_arch() {
        let flags = optimization_flags("core2").unwrap();
        assert_eq!(flags.optflags, "-march=core2");
        assert_eq!(
            flags.rustflags().as_deref(),
            Some("--codegen target-cpu=core2")
        );
        assert_eq!(optimization_flags("armv8").unwrap().rustflags(), None);
    }

    #[test]
    fn unknown_arch_fails() {
        let err = optimization_flags("pentium4").unwrap_err();
        assert!(matches!(err, Error::Architecture(ArchitectureError { ref arch }) if arch == "pentium4"));
    }

    #[test]
    fn effective_arch() {
        let host = host("x86_64");
        assert_eq!(host.effective_arch(false, Some("haswell")), "native");
        assert_eq!(host.effective_arch(true, Some("nehalem")), "nehalem");
        assert_eq!(host.effective_arch(true, None), "core2");
        assert_eq!(self::host("sparc64").effective_arch(true, None), "sparc64");
    }

    #[test]
    fn universal_arch_flags() {
        assert_eq!(arch_flags(UNIVERSAL_ARCHS), "-arch i386 -arch x86_64");
    }
}
