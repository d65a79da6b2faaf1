use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Args {
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Compiler to build with, e.g. clang, gcc or gcc-13
    #[arg(long)]
    pub cc: Option<String>,
    /// A dependency of the build
    #[arg(long = "dep", short = 'd', value_name = "NAME")]
    pub deps: Vec<String>,
    /// A keg-only dependency, not linked into the prefix
    #[arg(long = "keg-only", short = 'k', value_name = "NAME")]
    pub keg_only: Vec<String>,
    /// A dependency also needed at run time
    #[arg(long = "run-time", short = 'r', value_name = "NAME")]
    pub run_time: Vec<String>,
    #[arg(long)]
    pub formula_prefix: Option<PathBuf>,
    #[arg(long)]
    pub build_bottle: bool,
    #[arg(long, requires = "build_bottle")]
    pub bottle_arch: Option<String>,

    #[arg(long)]
    pub cxx11: bool,
    #[arg(long)]
    pub libcxx: bool,
    #[arg(long)]
    pub libstdcxx: bool,
    #[arg(long)]
    pub refurbish_args: bool,
    #[arg(long)]
    pub permit_arch_flags: bool,
    #[arg(long)]
    pub no_weak_imports: bool,
    #[arg(long)]
    pub universal: bool,
    /// Unset MAKEFLAGS so make runs one job at a time
    #[arg(long)]
    pub deparallelize: bool,

    /// Start from an empty environment instead of the current one
    #[arg(long)]
    pub clean: bool,
    #[arg(long, short = 'm')]
    pub nocolor: bool,
    #[arg(long, short)]
    pub verbose: bool,

    /// Command to run in the build environment
    #[arg(last = true)]
    pub command: Vec<String>,
}
