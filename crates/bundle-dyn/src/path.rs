//! Concrete paths into a value tree.

use crate::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A segment in a concrete path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathComponent {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

impl PathComponent {
    pub fn key(&self) -> Option<&str> {
        match self {
            PathComponent::Key(key) => Some(key),
            PathComponent::Index(_) => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            PathComponent::Key(_) => None,
            PathComponent::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathComponent::Key(key) => write_key(f, key),
            PathComponent::Index(index) => write!(f, "[{}]", index),
        }
    }
}

const ROOT: &str = "(root)";

/// Whether `key` must be written in the quoted `["..."]` form to parse back
/// as the same single key.
pub(crate) fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key == "*" || key == ROOT || key.contains(['.', '[', ']'])
}

/// Write a mapping key, quoting it when the bare form is ambiguous.
pub(crate) fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if !needs_quoting(key) {
        return f.write_str(key);
    }
    f.write_str("[\"")?;
    for ch in key.chars() {
        if ch == '"' || ch == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", ch)?;
    }
    f.write_str("\"]")
}

/// A concrete location in a value tree (e.g. `resources.jobs.etl.tasks[0]`).
///
/// The text form separates keys with `.` and writes indices as `[n]`. Keys
/// that are empty, `*`, or contain `.`, `[` or `]` are written quoted, as
/// in `resources.jobs["nightly.v2"]`, so every path parses back to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    components: Vec<PathComponent>,
}

impl Path {
    /// Create an empty path (the root).
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Build a path of mapping keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: keys
                .into_iter()
                .map(|k| PathComponent::Key(k.into()))
                .collect(),
        }
    }

    /// Push a key segment onto the path.
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.components.push(PathComponent::Key(key.into()));
    }

    /// Push an index segment onto the path.
    pub fn push_index(&mut self, index: usize) {
        self.components.push(PathComponent::Index(index));
    }

    /// Pop the last segment from the path.
    pub fn pop(&mut self) -> Option<PathComponent> {
        self.components.pop()
    }

    /// Return a new path with a key appended.
    pub fn key(&self, key: impl Into<String>) -> Path {
        let mut path = self.clone();
        path.push_key(key);
        path
    }

    /// Return a new path with an index appended.
    pub fn index(&self, index: usize) -> Path {
        let mut path = self.clone();
        path.push_index(index);
        path
    }

    /// Return a new path with all components of `other` appended.
    pub fn join(&self, other: &Path) -> Path {
        let mut path = self.clone();
        path.components.extend(other.components.iter().cloned());
        path
    }

    /// The path without its last component. The root has no parent.
    pub fn parent(&self) -> Option<Path> {
        if self.components.is_empty() {
            return None;
        }
        Some(Path {
            components: self.components[..self.components.len() - 1].to_vec(),
        })
    }

    /// The path truncated to its first `len` components.
    pub fn prefix(&self, len: usize) -> Path {
        Path {
            components: self.components[..len.min(self.components.len())].to_vec(),
        }
    }

    pub fn last(&self) -> Option<&PathComponent> {
        self.components.last()
    }

    pub fn has_prefix(&self, prefix: &Path) -> bool {
        self.components.starts_with(&prefix.components)
    }

    pub fn components(&self) -> &[PathComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }
}

impl From<Vec<PathComponent>> for Path {
    fn from(components: Vec<PathComponent>) -> Self {
        Self { components }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str(ROOT);
        }
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 && matches!(component, PathComponent::Key(key) if !needs_quoting(key)) {
                write!(f, ".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let components = split_components(input)?
            .into_iter()
            .map(|raw| match raw {
                RawComponent::Key(key) | RawComponent::Quoted(key) => Ok(PathComponent::Key(key)),
                RawComponent::Bracket(text) => text
                    .parse::<usize>()
                    .map(PathComponent::Index)
                    .map_err(|_| invalid(input, format!("invalid index [{}]", text))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Path { components })
    }
}

/// A lexical path segment before interpretation.
pub(crate) enum RawComponent {
    /// Text between dots
    Key(String),
    /// Text between square brackets
    Bracket(String),
    /// Quoted key between square brackets, unescaped
    Quoted(String),
}

pub(crate) fn invalid(input: &str, message: impl Into<String>) -> Error {
    Error::InvalidPath {
        input: input.to_string(),
        message: message.into(),
    }
}

/// Split `a.b[0].c["d.e"]` into `Key(a) Key(b) Bracket(0) Key(c) Quoted(d.e)`.
///
/// Shared by [`Path`] and [`crate::Pattern`] parsing. The empty string is the
/// root (no components). Inside a quoted key `\"` and `\\` are escapes.
pub(crate) fn split_components(input: &str) -> Result<Vec<RawComponent>> {
    let mut components = Vec::new();
    let mut chars = input.chars().peekable();
    let mut expect_key = true;

    while let Some(&c) = chars.peek() {
        match c {
            '[' => {
                chars.next();
                if chars.peek() == Some(&'"') {
                    chars.next();
                    let key = read_quoted(&mut chars)
                        .ok_or_else(|| invalid(input, "unterminated quoted key"))?;
                    if chars.next() != Some(']') {
                        return Err(invalid(input, "expected ']' after quoted key"));
                    }
                    components.push(RawComponent::Quoted(key));
                } else {
                    let mut text = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(ch) => text.push(ch),
                            None => return Err(invalid(input, "unterminated '['")),
                        }
                    }
                    components.push(RawComponent::Bracket(text));
                }
                expect_key = false;
            }
            '.' => {
                if expect_key {
                    return Err(invalid(input, "empty key"));
                }
                chars.next();
                expect_key = true;
                if chars.peek().is_none() {
                    return Err(invalid(input, "trailing '.'"));
                }
            }
            _ => {
                if !expect_key {
                    return Err(invalid(input, "expected '.' or '[' between segments"));
                }
                let mut key = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '.' || ch == '[' {
                        break;
                    }
                    if ch == ']' {
                        return Err(invalid(input, "unexpected ']'"));
                    }
                    key.push(ch);
                    chars.next();
                }
                components.push(RawComponent::Key(key));
                expect_key = false;
            }
        }
    }

    Ok(components)
}

/// Read up to and including the closing quote. `None` if it never comes.
fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut key = String::new();
    loop {
        match chars.next()? {
            '"' => return Some(key),
            '\\' => key.push(chars.next()?),
            ch => key.push(ch),
        }
    }
}
