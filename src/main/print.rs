use std::io::{stderr, Write};

use ansi_term::{Color::*, Style};
use superenv::{
    env::{valid_name, BuildEnv},
    CallBacks, Event, LogLevel, LogMessage,
};

#[derive(Debug, Default, Copy, Clone)]
pub struct Colors {
    pub enabled: bool,
    pub general: Style,
    pub error: Style,
    pub warning: Style,
    pub bold: Style,
    pub action: Style,
}

impl Colors {
    pub fn new() -> Colors {
        Colors {
            enabled: true,
            general: Style::new(),
            error: Style::new().fg(Red).bold(),
            warning: Style::new().fg(Yellow).bold(),
            bold: Style::new().bold(),
            action: Style::new().fg(Blue).bold(),
        }
    }
}

/// Prints progress and diagnostics to stderr, leaving stdout for the exports.
#[derive(Debug)]
pub struct Printer {
    colors: Colors,
    verbose: bool,
}

impl CallBacks for Printer {
    fn event(&mut self, event: Event) {
        let c = self.colors;
        let _ = match event {
            Event::ComposingEnvironment => writeln!(
                stderr(),
                "{} {}",
                c.action.paint("::"),
                c.bold.paint(event.to_string())
            ),
            _ if self.verbose => {
                writeln!(stderr(), "    {}", c.general.paint(event.to_string()))
            }
            _ => Ok(()),
        };
    }

    fn log(&mut self, level: LogLevel, msg: LogMessage) {
        let c = self.colors;
        let _ = match level {
            LogLevel::Warning => {
                writeln!(stderr(), "{}: {}", c.warning.paint(level.to_string()), msg)
            }
            LogLevel::Error => writeln!(stderr(), "{}: {}", c.error.paint(level.to_string()), msg),
            LogLevel::Debug if self.verbose => writeln!(stderr(), "{}: {}", level, msg),
            LogLevel::Debug => Ok(()),
        };
    }
}

impl Printer {
    pub fn new(color: bool, verbose: bool) -> Self {
        let colors = if color {
            Colors::new()
        } else {
            Colors::default()
        };

        Printer { colors, verbose }
    }
}

/// Quotes `value` for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Writes `env` as shell `export` lines. Names a shell cannot assign, such as
/// exported bash functions, are left out.
pub fn print_exports<W: Write>(w: &mut W, env: &BuildEnv) -> std::io::Result<()> {
    for (key, value) in env.iter().filter(|(key, _)| valid_name(key)) {
        writeln!(w, "export {}={}", key, shell_quote(value))?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(shell_quote("-j8"), "'-j8'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn exports() {
        let mut env = BuildEnv::new();
        env.set("MAKEFLAGS", "-j8");
        env.set("CC", "clang");
        env.set("BASH_FUNC_x%%", "() {  echo x\n}");

        let mut out = Vec::new();
        print_exports(&mut out, &env).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "export CC='clang'\nexport MAKEFLAGS='-j8'\n"
        );
    }
}
