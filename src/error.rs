use std::io::ErrorKind;
use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) trait IOErrorExt<T> {
    fn context(self, context: Context, iocontext: IOContext) -> StdResult<T, IOError>;
}

impl<T> IOErrorExt<T> for io::Result<T> {
    fn context(self, context: Context, iocontext: IOContext) -> StdResult<T, IOError> {
        self.map_err(|e| IOError::new(context, iocontext, e))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expected {
    String,
    Array,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::String => f.write_str("string"),
            Expected::Array => f.write_str("array"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnknownEscapeSequence(char),
    UnterminatedString(String),
    UnescapedQuoteInString(String),
    UnterminatedArray,
    UnexpectedWord(String),
    MissingAssignment,
    InvalidVariableName(String),
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::UnknownEscapeSequence(c) => {
                write!(f, "unknown escape sequence '\\{}'", c)
            }
            ParseErrorKind::UnterminatedString(word) => write!(f, "unterminated string: {}", word),
            ParseErrorKind::UnescapedQuoteInString(word) => {
                write!(f, "unescaped '\"' in quoted string: {}", word)
            }
            ParseErrorKind::UnterminatedArray => f.write_str("array is missing closing ')'"),
            ParseErrorKind::UnexpectedWord(word) => write!(f, "unexpected word {}", word),
            ParseErrorKind::MissingAssignment => f.write_str("expected NAME=value"),
            ParseErrorKind::InvalidVariableName(name) => {
                write!(f, "invalid variable name '{}'", name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: String,
    pub kind: ParseErrorKind,
    pub file: PathBuf,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to parse {}: {}", self.file.display(), self.kind)
    }
}

impl ParseError {
    pub(crate) fn new<S: Into<String>>(line: S, file: &Path, kind: ParseErrorKind) -> Self {
        Self {
            line: line.into(),
            file: file.to_path_buf(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Context {
    ReadConfig,
    ComposeEnvironment,
    None,
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Context::ReadConfig => f.write_str("failed to read config file"),
            Context::ComposeEnvironment => f.write_str("failed to compose build environment"),
            Context::None => f.write_str("no context"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IOContext {
    Read(PathBuf),
    CurrentDir,
    NotFound(PathBuf),
}

impl Display for IOContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IOContext::Read(p) => write!(f, "read {}", p.display()),
            IOContext::CurrentDir => write!(f, "failed to get current directory"),
            IOContext::NotFound(p) => write!(f, "{}: no such file or directory", p.display()),
        }
    }
}

#[derive(Debug)]
pub struct IOError {
    pub context: Context,
    pub iocontext: IOContext,
    pub err: std::io::Error,
}

impl std::error::Error for IOError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

impl Display for IOError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.context != Context::None {
            write!(f, "{}", self.context)?;
        }
        write!(f, ": {}", self.iocontext)?;

        if self.err.kind() != ErrorKind::Other {
            write!(f, ": {}", self.err)?;
        }
        Ok(())
    }
}

impl IOError {
    pub(crate) fn new<E: Into<io::Error>>(context: Context, iocontext: IOContext, err: E) -> Self {
        IOError {
            context,
            iocontext,
            err: err.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintKind {
    WrongValueType(String, Expected, Expected),
    VariableContainsNewlines(String),
    VariableContainsEmptyString(String),
    NotAbsolute(String, PathBuf),
    InvalidMakeJobs(String),
}

impl Display for LintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LintKind::WrongValueType(name, expected, got) => {
                write!(f, "{}: expected {} got {}", name, expected, got)
            }
            LintKind::VariableContainsNewlines(v) => write!(f, "{} does not allow new lines", v),
            LintKind::VariableContainsEmptyString(v) => {
                write!(f, "{} does not allow empty values", v)
            }
            LintKind::NotAbsolute(v, p) => {
                write!(f, "{} must be an absolute path: '{}'", v, p.display())
            }
            LintKind::InvalidMakeJobs(j) => {
                write!(f, "HOMEBREW_MAKE_JOBS must be a positive integer not '{}'", j)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintError {
    pub issues: Vec<LintKind>,
}

impl Display for LintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid config: ")?;
        if let Some(issue) = self.issues.first() {
            issue.fmt(f)?;
        }
        for issue in self.issues.iter().skip(1) {
            f.write_str("\n    ")?;
            issue.fmt(f)?;
        }
        Ok(())
    }
}

impl LintError {
    pub(crate) fn config(issues: Vec<LintKind>) -> Self {
        LintError { issues }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitectureError {
    pub arch: String,
}

impl Display for ArchitectureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: no optimization flags for the {} architecture",
            Context::ComposeEnvironment,
            self.arch
        )
    }
}

#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Lint(LintError),
    IO(IOError),
    Architecture(ArchitectureError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IO(e) => Some(&e.err as _),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(e) => e.fmt(f),
            Error::Lint(e) => e.fmt(f),
            Error::IO(e) => e.fmt(f),
            Error::Architecture(e) => e.fmt(f),
        }
    }
}

impl From<ParseError> for Error {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<IOError> for Error {
    fn from(value: IOError) -> Self {
        Self::IO(value)
    }
}

impl From<LintError> for Error {
    fn from(value: LintError) -> Self {
        Self::Lint(value)
    }
}

impl From<ArchitectureError> for Error {
    fn from(value: ArchitectureError) -> Self {
        Error::Architecture(value)
    }
}
