//! Structuring errors with path tracking

use std::fmt;

/// One step of a path from the JSON root to a nested value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathItem {
    /// Record field, identified by its in-memory name
    Field(&'static str),
    /// Array element index
    Index(usize),
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathItem::Field(name) => write!(f, "{}", name),
            PathItem::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Failure to structure a JSON value into a typed value.
///
/// An error is either a leaf (a single message at a path) or a group
/// collecting the failures of the elements of an aggregate type.
/// Paths are accumulated as the error propagates out of nested values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringError {
    path: Vec<PathItem>,
    message: String,
    children: Vec<StructuringError>,
}

impl StructuringError {
    /// Create a leaf error at the current structuring position
    pub fn at_root(message: impl Into<String>) -> Self {
        StructuringError {
            path: Vec::new(),
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Create a group error aggregating the given failures
    pub fn group(message: impl Into<String>, children: Vec<StructuringError>) -> Self {
        StructuringError {
            path: Vec::new(),
            message: message.into(),
            children,
        }
    }

    /// Prefix this error and all its descendants with a path step
    pub fn nest(mut self, item: PathItem) -> Self {
        self.prepend(&item);
        self
    }

    fn prepend(&mut self, item: &PathItem) {
        self.path.insert(0, item.clone());
        for child in &mut self.children {
            child.prepend(item);
        }
    }

    /// The path from the root to the failing value
    pub fn path(&self) -> &[PathItem] {
        &self.path
    }

    /// The error message without path decoration
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Dot-joined path, or `<root>` for the top level
    pub fn path_str(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path
                .iter()
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(".")
        }
    }

    fn collect_messages(&self, level: usize, out: &mut Vec<(usize, String, String)>) {
        out.push((level, self.path_str(), self.message.clone()));
        for child in &self.children {
            child.collect_messages(level + 1, out);
        }
    }
}

impl fmt::Display for StructuringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.children.is_empty() {
            write!(f, "Failed to structure at `{}`: {}", self.path_str(), self.message)
        } else {
            write!(f, "Failed to structure:")?;
            let mut messages = Vec::new();
            self.collect_messages(0, &mut messages);
            for (level, path, message) in messages {
                write!(f, "\n{}{}: {}", " ".repeat((level + 1) * 2), path, message)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for StructuringError {}
