mod args;
mod print;

use print::Printer;

use std::{
    io::{stderr, stdout, IsTerminal},
    path::Path,
    process::{exit, Command},
};

use ansi_term::{Color, Style};
use anyhow::{bail, Context, Error, Result};
use args::Args;
use clap::Parser;
use nix::unistd::Uid;
use superenv::{
    compiler::Compiler,
    config::Config,
    dependency::{Dependency, DependencySet},
    env::BuildEnv,
    BuildRequest, CallBacks, LogLevel, LogMessage, Superenv,
};

pub fn print_error(style: Style, err: Error) {
    eprint!("{}", style.paint("error"));

    for link in err.chain() {
        eprint!(": {}", link);
    }
    eprintln!();
}

pub fn main() {
    match run() {
        Ok(code) => exit(code),
        Err(e) => {
            print_error(Style::new().fg(Color::Red).bold(), e);
            exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Args::parse();

    if Uid::current().is_root() {
        bail!("running {} as root is not allowed", env!("CARGO_PKG_NAME"))
    }

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::new()?,
    };

    let color = !cli.nocolor && stderr().is_terminal();
    let mut printer = Printer::new(color, cli.verbose);
    for warning in config.warnings() {
        printer.log(LogLevel::Warning, LogMessage::Config(warning));
    }

    let deps = dependencies(&cli, &config.prefix);
    let superenv = Superenv::from_config(config).callbacks(printer);
    let request = request(&cli);

    let env = if cli.clean {
        BuildEnv::new()
    } else {
        BuildEnv::from_process()
    };
    let mut env = superenv.compose(env, &deps, &request)?;
    apply_flags(&superenv, &cli, &mut env);

    if cli.command.is_empty() {
        if cli.deparallelize {
            env.deparallelize();
        }
        print::print_exports(&mut stdout().lock(), &env)?;
        return Ok(0);
    }

    if cli.deparallelize {
        let (_, status) = env.deparallelized(|env| run_command(env, &cli.command));
        status
    } else {
        run_command(&env, &cli.command)
    }
}

fn request(cli: &Args) -> BuildRequest {
    let compiler = cli
        .cc
        .as_deref()
        .map(Compiler::from_name)
        .unwrap_or_default();
    let mut request = BuildRequest::new(compiler);

    if let Some(prefix) = &cli.formula_prefix {
        request = request.formula_prefix(prefix);
    }
    if cli.build_bottle {
        request = request.bottle(cli.bottle_arch.clone());
    }
    request
}

/// Resolves the named dependencies, in the order first named.
fn dependencies(cli: &Args, prefix: &Path) -> DependencySet {
    let mut deps: Vec<Dependency> = Vec::new();
    let names = cli.deps.iter().chain(&cli.keg_only).chain(&cli.run_time);

    for name in names {
        if deps.iter().any(|d| &d.name == name) {
            continue;
        }
        let mut dep = Dependency::installed(name.as_str(), prefix);
        if cli.keg_only.contains(name) {
            dep = dep.keg_only();
        }
        if cli.run_time.contains(name) {
            dep = dep.run_time();
        }
        deps.push(dep);
    }

    DependencySet::new(deps)
}

fn apply_flags(superenv: &Superenv, cli: &Args, env: &mut BuildEnv) {
    if cli.cxx11 {
        superenv.cxx11(env);
    }
    if cli.libcxx {
        superenv.libcxx(env);
    }
    if cli.libstdcxx {
        superenv.libstdcxx(env);
    }
    if cli.refurbish_args {
        superenv.refurbish_args(env);
    }
    if cli.permit_arch_flags {
        superenv.permit_arch_flags(env);
    }
    if cli.no_weak_imports {
        superenv.no_weak_imports(env);
    }
    if cli.universal {
        superenv.universal_binary(env);
    }
}

fn run_command(env: &BuildEnv, command: &[String]) -> Result<i32> {
    let (program, args) = match command.split_first() {
        Some(split) => split,
        None => bail!("no command given"),
    };

    let mut cmd = Command::new(program);
    cmd.args(args);
    env.apply(&mut cmd);

    let status = cmd
        .status()
        .with_context(|| format!("failed to run {}", program))?;
    Ok(status.code().unwrap_or(1))
}
