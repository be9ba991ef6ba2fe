//! Class name filters.
//!
//! Patterns follow the profiler's usual wildcard syntax:
//! - `java.util.HashMap` matches that class only (and arrays of it)
//! - `java.util.*` matches classes directly in `java.util`
//! - `java.util.**` matches `java.util` and all subpackages
//!
//! VM-form names (`java/util/HashMap`) are accepted on both sides.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassPattern {
    Exact(String),
    Package(String),
    Subtree(String),
}

impl ClassPattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = normalize(pattern.trim());
        if let Some(prefix) = pattern.strip_suffix(".**") {
            ClassPattern::Subtree(prefix.to_string())
        } else if let Some(prefix) = pattern.strip_suffix(".*") {
            ClassPattern::Package(prefix.to_string())
        } else {
            ClassPattern::Exact(pattern)
        }
    }

    pub fn matches(&self, class_name: &str) -> bool {
        let name = normalize(class_name);
        let name = name.trim_end_matches("[]");
        match self {
            ClassPattern::Exact(exact) => name == exact,
            ClassPattern::Package(package) => match name.rsplit_once('.') {
                Some((pkg, _)) => pkg == package,
                None => package.is_empty(),
            },
            ClassPattern::Subtree(package) => {
                name.len() > package.len()
                    && name.starts_with(package.as_str())
                    && name[package.len()..].starts_with('.')
            }
        }
    }
}

fn normalize(name: &str) -> String {
    name.replace('/', ".")
}

/// A set of class patterns; a class passes if any pattern matches it.
/// An empty filter passes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassFilter {
    patterns: Vec<ClassPattern>,
}

impl ClassFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .filter(|p| !p.as_ref().trim().is_empty())
                .map(|p| ClassPattern::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn passes(&self, class_name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(class_name))
    }
}
