use std::{
    env::var_os,
    ffi::OsStr,
    io::{stdout, Write},
    os::unix::ffi::OsStrExt,
    path::PathBuf,
};

fn set_var<S: AsRef<OsStr>>(var: &str, s: S) {
    let mut stdout = stdout().lock();
    writeln!(stdout, "cargo:rerun-if-env-changed={}", var).unwrap();
    write!(stdout, "cargo:rustc-env={}=", var).unwrap();
    stdout.write_all(s.as_ref().as_bytes()).unwrap();
    writeln!(stdout).unwrap()
}

fn var<P: Into<PathBuf>>(key: &str, or: P) -> PathBuf {
    var_os(key).map(PathBuf::from).unwrap_or(or.into())
}

fn main() {
    println!("cargo:rerun-if-changed=.env");
    let _ = dotenvy::dotenv();

    let prefix = var("PREFIX", "/usr/local");
    let library = var("LIBRARY", prefix.join("Library"));
    let sysconfdir = var("SYSCONFDIR", "/etc");
    let tempdir = var("TEMPDIR", "/tmp");

    set_var("PREFIX", prefix);
    set_var("LIBRARY", library);
    set_var("SYSCONFDIR", sysconfdir);
    set_var("TEMPDIR", tempdir);
}
