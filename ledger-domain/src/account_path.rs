use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::error::DomainError;

/// Component separator for dotted account paths.
pub const SEPARATOR: char = '.';
/// Wildcard token matching any single component at that depth.
pub const WILDCARD: &str = "*";
/// Minimum number of components an account path must have.
pub const MIN_DEPTH: usize = 3;

/// Default top-level account classes. Configurable per deployment (spec.md
/// §4.1 "left configurable"); `parse_with_classes` accepts an override.
static DEFAULT_CLASSES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["assets", "liability", "equity", "income", "expense"]
        .into_iter()
        .collect()
});

/// Whether an [`AccountPath`] identifies exactly one account (`Analytic`) or
/// matches a family of accounts through `*` wildcards (`Synthetic`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Analytic,
    Synthetic,
}

/// A validated, canonical-lowercase, dotted account path such as
/// `liability.clients.available.111` or, for reads, `liability.clients.*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountPath {
    value: String,
    components: Vec<String>,
}

impl AccountPath {
    /// Parses `text` against the default top-level account classes.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        Self::parse_with_classes(text, &DEFAULT_CLASSES)
    }

    pub fn parse_with_classes(
        text: &str,
        allowed_classes: &HashSet<&str>,
    ) -> Result<Self, DomainError> {
        if text.is_empty() {
            return Err(DomainError::InvalidAccount("empty account path".into()));
        }

        if text.contains("..") {
            return Err(DomainError::InvalidAccount(
                "account path has consecutive separators".into(),
            ));
        }

        let components: Vec<String> = text.split(SEPARATOR).map(str::to_owned).collect();

        if components.len() < MIN_DEPTH {
            return Err(DomainError::InvalidDepth {
                min: MIN_DEPTH,
                actual: components.len(),
            });
        }

        for component in &components {
            if component.is_empty() {
                return Err(DomainError::InvalidAccount(
                    "account path has an empty component".into(),
                ));
            }

            if component == WILDCARD {
                continue;
            }

            if !component
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
            {
                return Err(DomainError::InvalidAccountComponentCharacters);
            }
        }

        let top_level = components[0].as_str();
        if !allowed_classes.contains(top_level) {
            return Err(DomainError::InvalidAccount(format!(
                "unknown top-level account class: {top_level}"
            )));
        }

        Ok(AccountPath {
            value: components.join(&SEPARATOR.to_string()),
            components,
        })
    }

    pub fn kind(&self) -> AccountKind {
        if self.components.iter().any(|c| c == WILDCARD) {
            AccountKind::Synthetic
        } else {
            AccountKind::Analytic
        }
    }

    pub fn depth(&self) -> usize {
        self.components.len()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Truncates this path to its first `level` components, used by
    /// synthetic reports to form a group key (spec.md §4.3.4).
    pub fn truncated(&self, level: usize) -> String {
        let level = level.clamp(1, self.components.len());
        self.components[..level].join(&SEPARATOR.to_string())
    }

    /// Whether this path (assumed analytic) matches the given synthetic
    /// pattern: same depth, fixed components equal, wildcard positions match
    /// any non-separator token.
    pub fn matches(&self, pattern: &AccountPath) -> bool {
        if self.components.len() != pattern.components.len() {
            return false;
        }

        self.components
            .iter()
            .zip(pattern.components.iter())
            .all(|(actual, expected)| expected == WILDCARD || actual == expected)
    }
}

impl std::fmt::Display for AccountPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analytic_path() {
        let p = AccountPath::parse("liability.clients.available.111").unwrap();
        assert_eq!(p.kind(), AccountKind::Analytic);
        assert_eq!(p.depth(), 4);
        assert_eq!(p.value(), "liability.clients.available.111");
    }

    #[test]
    fn parses_synthetic_path() {
        let p = AccountPath::parse("liability.clients.*").unwrap();
        assert_eq!(p.kind(), AccountKind::Synthetic);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            AccountPath::parse(""),
            Err(DomainError::InvalidAccount(_))
        ));
    }

    #[test]
    fn rejects_shallow_depth() {
        assert!(matches!(
            AccountPath::parse("assets.clients"),
            Err(DomainError::InvalidDepth { min: 3, actual: 2 })
        ));
    }

    #[test]
    fn rejects_unknown_class() {
        assert!(matches!(
            AccountPath::parse("unknownclass.a.b"),
            Err(DomainError::InvalidAccount(_))
        ));
    }

    #[test]
    fn rejects_consecutive_separators() {
        assert!(matches!(
            AccountPath::parse("assets..b.c"),
            Err(DomainError::InvalidAccount(_))
        ));
    }

    #[test]
    fn rejects_uppercase() {
        assert!(matches!(
            AccountPath::parse("assets.Clients.b"),
            Err(DomainError::InvalidAccountComponentCharacters)
        ));
    }

    #[test]
    fn synthetic_matches_same_depth_with_wildcard() {
        let pattern = AccountPath::parse("liability.clients.*").unwrap();
        let a = AccountPath::parse("liability.clients.user_1").unwrap();
        let b = AccountPath::parse("liability.clients.user_2.sub").unwrap();
        assert!(a.matches(&pattern));
        assert!(!b.matches(&pattern));
    }

    #[test]
    fn truncated_respects_level() {
        let p = AccountPath::parse("liability.assets.debit.sub").unwrap();
        assert_eq!(p.truncated(3), "liability.assets.debit");
        assert_eq!(p.truncated(0), "liability");
        assert_eq!(p.truncated(99), "liability.assets.debit.sub");
    }
}
