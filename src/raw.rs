//! Raw config is a simple, lossless reader for `superenv.conf` files.
//!
//! It only splits the file into variables and does no validation. Checking
//! that values have the right type and make sense is done on top of this by
//! [`Config`](`crate::config::Config`) so that problems can be reported together.
//!
//! The format is line based:
//!
//! ```text
//! # comment
//! HOMEBREW_PREFIX=/opt/homebrew
//! export HOMEBREW_TEMP="/private/tmp"
//! EXTRA_PATHS=(/opt/X11/bin "/Applications/Some App.app/Contents/bin")
//! ```
//!
//! A value is either one word or a parenthesised list of words. Words may be
//! quoted with `"`; inside quotes `\"`, `\\` and `\n` are escapes.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use crate::{
    env::valid_name,
    error::{
        Context, Expected, IOContext, IOErrorExt, LintKind, ParseError, ParseErrorKind, Result,
    },
};

pub(crate) type LintResult<T> = std::result::Result<T, LintKind>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Array(Vec<String>),
}

impl Value {
    fn kind(&self) -> Expected {
        match self {
            Value::String(_) => Expected::String,
            Value::Array(_) => Expected::Array,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
}

impl Variable {
    pub fn new<S: Into<String>>(name: S, value: Value) -> Self {
        Variable {
            name: name.into(),
            value,
        }
    }

    pub fn get_array(self) -> LintResult<Vec<String>> {
        match self.value {
            Value::Array(a) => Ok(a),
            v => Err(LintKind::WrongValueType(
                self.name,
                Expected::Array,
                v.kind(),
            )),
        }
    }

    pub fn get_path_array(self) -> LintResult<Vec<PathBuf>> {
        self.get_array()
            .map(|v| v.into_iter().map(PathBuf::from).collect())
    }

    pub fn get_string(self) -> LintResult<String> {
        match self.value {
            Value::String(s) => Ok(s),
            v => Err(LintKind::WrongValueType(
                self.name,
                Expected::String,
                v.kind(),
            )),
        }
    }

    pub fn lint_string(self, lints: &mut Vec<LintKind>) -> Option<String> {
        self.get_string().map_err(|e| lints.push(e)).ok()
    }

    pub fn lint_path_array(self, lints: &mut Vec<LintKind>) -> Vec<PathBuf> {
        self.get_path_array()
            .map_err(|e| lints.push(e))
            .unwrap_or_default()
    }
}

#[derive(Default, Debug)]
pub struct RawConfig {
    pub variables: Vec<Variable>,
}

impl RawConfig {
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut config = RawConfig::default();

        for path in paths {
            let path = path.as_ref();
            let contents = read_to_string(path)
                .context(Context::ReadConfig, IOContext::Read(path.to_path_buf()))?;
            config.parse_into(path, &contents)?;
        }

        Ok(config)
    }

    pub fn parse(file: &Path, s: &str) -> Result<Self> {
        let mut config = RawConfig::default();
        config.parse_into(file, s)?;
        Ok(config)
    }

    fn parse_into(&mut self, file: &Path, s: &str) -> Result<()> {
        for line in s.lines() {
            if let Some(var) = parse_line(line, file)? {
                self.variables.push(var);
            }
        }
        Ok(())
    }
}

fn words(line: &str, file: &Path) -> Result<Vec<String>> {
    let mut words = Vec::new();

    let mut rest = line.trim();

    while !rest.is_empty() {
        if rest.starts_with('"') {
            let mut word = String::new();
            let mut chars = rest.chars();
            chars.next();

            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some('\\') => word.push('\\'),
                        Some('"') => word.push('"'),
                        Some('n') => word.push('\n'),
                        Some(c) => {
                            return Err(ParseError::new(
                                line,
                                file,
                                ParseErrorKind::UnknownEscapeSequence(c),
                            )
                            .into())
                        }
                        None => {
                            return Err(ParseError::new(
                                line,
                                file,
                                ParseErrorKind::UnterminatedString(word),
                            )
                            .into())
                        }
                    },
                    Some('"') => break,
                    Some(c) => word.push(c),
                    None => {
                        return Err(ParseError::new(
                            line,
                            file,
                            ParseErrorKind::UnterminatedString(word),
                        )
                        .into())
                    }
                }
            }

            match chars.next() {
                None => (),
                Some(c) if c.is_whitespace() => (),
                Some(_) => {
                    return Err(ParseError::new(
                        line,
                        file,
                        ParseErrorKind::UnescapedQuoteInString(word),
                    )
                    .into())
                }
            }

            words.push(word);
            rest = chars.as_str().trim_start()
        } else {
            let (word, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            words.push(word.to_string());
            rest = tail.trim_start();
        }
    }

    Ok(words)
}

fn parse_line(line: &str, file: &Path) -> Result<Option<Variable>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let trimmed = trimmed
        .strip_prefix("export ")
        .map(str::trim_start)
        .unwrap_or(trimmed);

    let (name, value) = trimmed
        .split_once('=')
        .ok_or_else(|| ParseError::new(line, file, ParseErrorKind::MissingAssignment))?;

    if !valid_name(name) {
        return Err(ParseError::new(
            line,
            file,
            ParseErrorKind::InvalidVariableName(name.to_string()),
        )
        .into());
    }

    let value = if let Some(inner) = value.strip_prefix('(') {
        let inner = inner
            .trim_end()
            .strip_suffix(')')
            .ok_or_else(|| ParseError::new(line, file, ParseErrorKind::UnterminatedArray))?;
        Value::Array(words(inner, file)?)
    } else {
        let mut words = words(value, file)?.into_iter();
        let word = words.next().unwrap_or_default();
        if let Some(extra) = words.next() {
            return Err(
                ParseError::new(line, file, ParseErrorKind::UnexpectedWord(extra)).into(),
            );
        }
        Value::String(word)
    };

    Ok(Some(Variable::new(name, value)))
}

#[cfg(test)]
mod test {
    use crate::error::Error;

    use super::*;

    fn parse(s: &str) -> Result<RawConfig> {
        RawConfig::parse(Path::new("superenv.conf"), s)
    }

    fn parse_err(s: &str) -> ParseErrorKind {
        match parse(s) {
            Err(Error::Parse(e)) => e.kind,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn strings_and_arrays() {
        let config = parse(
            r#"
# prefix
HOMEBREW_PREFIX=/opt/homebrew
export HOMEBREW_TEMP="/private/tmp"
EMPTY=
EXTRA_PATHS=(/opt/X11/bin "/Applications/Some App.app/bin" )
"#,
        )
        .unwrap();

        assert_eq!(
            config.variables,
            vec![
                Variable::new("HOMEBREW_PREFIX", Value::String("/opt/homebrew".into())),
                Variable::new("HOMEBREW_TEMP", Value::String("/private/tmp".into())),
                Variable::new("EMPTY", Value::String(String::new())),
                Variable::new(
                    "EXTRA_PATHS",
                    Value::Array(vec![
                        "/opt/X11/bin".into(),
                        "/Applications/Some App.app/bin".into()
                    ])
                ),
            ]
        );
    }

    #[test]
    fn escapes() {
        let config = parse(r#"A="say \"hi\"\\""#).unwrap();
        assert_eq!(
            config.variables[0].value,
            Value::String(r#"say "hi"\"#.into())
        );
    }

    #[test]
    fn errors() {
        assert_eq!(parse_err("JUSTANAME"), ParseErrorKind::MissingAssignment);
        assert_eq!(
            parse_err("1BAD=x"),
            ParseErrorKind::InvalidVariableName("1BAD".into())
        );
        assert_eq!(parse_err("A=(a b"), ParseErrorKind::UnterminatedArray);
        assert_eq!(
            parse_err("A=one two"),
            ParseErrorKind::UnexpectedWord("two".into())
        );
        assert_eq!(
            parse_err(r#"A="open"#),
            ParseErrorKind::UnterminatedString("open".into())
        );
        assert_eq!(
            parse_err(r#"A="a"b"#),
            ParseErrorKind::UnescapedQuoteInString("a".into())
        );
        assert_eq!(
            parse_err(r#"A="\t""#),
            ParseErrorKind::UnknownEscapeSequence('t')
        );
    }

    #[test]
    fn wrong_type() {
        let var = Variable::new("EXTRA_PATHS", Value::String("/x".into()));
        assert_eq!(
            var.get_path_array(),
            Err(LintKind::WrongValueType(
                "EXTRA_PATHS".into(),
                Expected::Array,
                Expected::String
            ))
        );
    }
}
