//! Path patterns with wildcard segments.

use crate::path::{RawComponent, invalid, needs_quoting, split_components, write_key};
use crate::{Error, Path, PathComponent, Result};
use std::fmt;
use std::str::FromStr;

/// A segment in a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternComponent {
    /// Exactly this mapping key
    Key(String),
    /// Exactly this sequence index
    Index(usize),
    /// Any mapping key (`*`)
    AnyKey,
    /// Any sequence index (`[*]`)
    AnyIndex,
}

impl PatternComponent {
    /// Check if a concrete path component matches this pattern component.
    ///
    /// Key patterns only match mapping keys and index patterns only match
    /// sequence indices.
    pub fn matches(&self, component: &PathComponent) -> bool {
        match (self, component) {
            (PatternComponent::Key(want), PathComponent::Key(got)) => want == got,
            (PatternComponent::Index(want), PathComponent::Index(got)) => want == got,
            (PatternComponent::AnyKey, PathComponent::Key(_)) => true,
            (PatternComponent::AnyIndex, PathComponent::Index(_)) => true,
            _ => false,
        }
    }
}

impl From<&PathComponent> for PatternComponent {
    fn from(component: &PathComponent) -> Self {
        match component {
            PathComponent::Key(key) => PatternComponent::Key(key.clone()),
            PathComponent::Index(index) => PatternComponent::Index(*index),
        }
    }
}

impl fmt::Display for PatternComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternComponent::Key(key) => write_key(f, key),
            PatternComponent::Index(index) => write!(f, "[{}]", index),
            PatternComponent::AnyKey => write!(f, "*"),
            PatternComponent::AnyIndex => write!(f, "[*]"),
        }
    }
}

/// A path template used to enumerate matching locations in a tree.
///
/// `resources.*.*` matches every resource instance regardless of type;
/// `resources.*.*.permissions` additionally selects each resource's
/// permission list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    components: Vec<PatternComponent>,
}

impl Pattern {
    pub fn new(components: Vec<PatternComponent>) -> Self {
        Self { components }
    }

    /// Return a new pattern with a component appended.
    pub fn append(&self, component: PatternComponent) -> Pattern {
        let mut components = self.components.clone();
        components.push(component);
        Pattern { components }
    }

    /// Check if `path` matches this pattern exactly (same length).
    pub fn matches(&self, path: &Path) -> bool {
        path.len() == self.components.len() && self.matches_prefix(path)
    }

    /// Check if `path` could be extended into a match of this pattern.
    ///
    /// True when every component of `path` matches the corresponding
    /// pattern component and `path` is no longer than the pattern.
    pub fn matches_prefix(&self, path: &Path) -> bool {
        path.len() <= self.components.len()
            && self
                .components
                .iter()
                .zip(path.components())
                .all(|(pattern, component)| pattern.matches(component))
    }

    pub fn components(&self) -> &[PatternComponent] {
        &self.components
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }
}

impl From<&Path> for Pattern {
    fn from(path: &Path) -> Self {
        Pattern {
            components: path.components().iter().map(PatternComponent::from).collect(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "(root)");
        }
        for (i, component) in self.components.iter().enumerate() {
            let dotted = match component {
                PatternComponent::Key(key) => !needs_quoting(key),
                PatternComponent::AnyKey => true,
                PatternComponent::Index(_) | PatternComponent::AnyIndex => false,
            };
            if i > 0 && dotted {
                write!(f, ".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let components = split_components(input)?
            .into_iter()
            .map(|raw| match raw {
                RawComponent::Key(key) if key == "*" => Ok(PatternComponent::AnyKey),
                RawComponent::Key(key) | RawComponent::Quoted(key) => Ok(PatternComponent::Key(key)),
                RawComponent::Bracket(text) if text == "*" => Ok(PatternComponent::AnyIndex),
                RawComponent::Bracket(text) => text
                    .parse::<usize>()
                    .map(PatternComponent::Index)
                    .map_err(|_| invalid(input, format!("invalid index [{}]", text))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Pattern { components })
    }
}
