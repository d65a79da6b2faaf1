use std::{cell::RefCell, fmt::Display};

use crate::{build_env::OptimizationLevel, config::Warning, Superenv};

pub trait CallBacks: std::fmt::Debug {
    fn event(&mut self, _event: Event) {}
    fn log(&mut self, _level: LogLevel, _msg: LogMessage) {}
}

#[derive(Debug)]
pub struct CallBackPrinter;

impl CallBacks for CallBackPrinter {
    fn event(&mut self, event: Event) {
        eprintln!(":: {}", event);
    }

    fn log(&mut self, level: LogLevel, msg: LogMessage) {
        eprintln!("{}: {}", level, msg);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ComposingEnvironment,
    UsingCompiler(String, String),
    UsingArchitecture(String),
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::ComposingEnvironment => write!(f, "Composing build environment..."),
            Event::UsingCompiler(cc, cxx) => write!(f, "using compilers {} and {}", cc, cxx),
            Event::UsingArchitecture(arch) => write!(f, "optimizing for {}", arch),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Warning,
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => f.write_str("debug"),
            LogLevel::Warning => f.write_str("warning"),
            LogLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deprecation {
    UniversalBinary,
    M32,
    M64,
    OptimizationLevel(OptimizationLevel),
    Libstdcxx,
}

impl Display for Deprecation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deprecation::UniversalBinary => f.write_str("universal binary builds are deprecated"),
            Deprecation::M32 => f.write_str("forcing -m32 is deprecated"),
            Deprecation::M64 => f.write_str("forcing -m64 is deprecated"),
            Deprecation::OptimizationLevel(level) => write!(
                f,
                "overriding the optimization level with -{} is deprecated",
                level
            ),
            Deprecation::Libstdcxx => f.write_str("forcing libstdc++ is deprecated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    Deprecated(Deprecation),
    ToolchainUnavailable(String),
    StdlibNeedsClang(String),
    Config(Warning),
}

impl Display for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogMessage::Deprecated(d) => d.fmt(f),
            LogMessage::ToolchainUnavailable(pkg) => {
                write!(f, "{} is not installed, not adding it to PATH", pkg)
            }
            LogMessage::StdlibNeedsClang(cc) => {
                write!(f, "ignoring C++ standard library choice for {}", cc)
            }
            LogMessage::Config(w) => w.fmt(f),
        }
    }
}

impl From<Deprecation> for LogMessage {
    fn from(value: Deprecation) -> Self {
        LogMessage::Deprecated(value)
    }
}

impl Superenv {
    pub fn callbacks<CB: CallBacks + 'static>(mut self, callbacks: CB) -> Self {
        self.callbacks = Some(Box::new(RefCell::new(callbacks)));
        self
    }

    pub fn event(&self, event: Event) {
        if let Some(cb) = &self.callbacks {
            cb.borrow_mut().event(event)
        }
    }

    pub fn log(&self, level: LogLevel, msg: LogMessage) {
        if let Some(cb) = &self.callbacks {
            cb.borrow_mut().log(level, msg)
        }
    }

    pub(crate) fn deprecated(&self, deprecation: Deprecation) {
        self.log(LogLevel::Warning, deprecation.into())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::rc::Rc;

    use super::*;

    /// Keeps every callback so tests can look at them afterwards.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct Recorder {
        pub events: Rc<RefCell<Vec<Event>>>,
        pub logs: Rc<RefCell<Vec<(LogLevel, LogMessage)>>>,
    }

    impl CallBacks for Recorder {
        fn event(&mut self, event: Event) {
            self.events.borrow_mut().push(event);
        }

        fn log(&mut self, level: LogLevel, msg: LogMessage) {
            self.logs.borrow_mut().push((level, msg));
        }
    }

    impl Recorder {
        pub(crate) fn warnings(&self) -> Vec<LogMessage> {
            self.logs
                .borrow()
                .iter()
                .filter(|(level, _)| *level == LogLevel::Warning)
                .map(|(_, msg)| msg.clone())
                .collect()
        }
    }

    #[test]
    fn messages() {
        assert_eq!(
            LogMessage::from(Deprecation::OptimizationLevel(OptimizationLevel::O3)).to_string(),
            "overriding the optimization level with -O3 is deprecated"
        );
        assert_eq!(
            Event::UsingCompiler("gcc-13".into(), "g++-13".into()).to_string(),
            "using compilers gcc-13 and g++-13"
        );
    }
}
