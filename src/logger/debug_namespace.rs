//! `DEBUG`-style namespace matching.
//!
//! Patterns are separated by commas or spaces. `*` matches everything, `ns:*` matches `ns` and
//! anything under `ns:`, and any other pattern matches exactly.

#[derive(Debug, Clone, PartialEq, Eq)]
enum NamespacePattern {
    Any,
    Exact(String),
    Subtree(String),
}

impl NamespacePattern {
    fn matches(&self, namespace: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(name) => name == namespace,
            Self::Subtree(root) => {
                namespace == root
                    || namespace
                        .strip_prefix(root.as_str())
                        .is_some_and(|rest| rest.starts_with(':'))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugNamespaces {
    patterns: Vec<NamespacePattern>,
}

impl DebugNamespaces {
    pub fn parse(source: &str) -> Self {
        let patterns = source
            .split([',', ' '])
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                if pattern == "*" {
                    NamespacePattern::Any
                } else if let Some(root) = pattern.strip_suffix(":*") {
                    NamespacePattern::Subtree(root.to_string())
                } else {
                    NamespacePattern::Exact(pattern.to_string())
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, namespace: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(namespace))
    }
}

/// One-shot check of `namespace` against a `DEBUG`-style pattern list.
pub fn is_debug_namespace(source: &str, namespace: &str) -> bool {
    DebugNamespaces::parse(source).matches(namespace)
}
