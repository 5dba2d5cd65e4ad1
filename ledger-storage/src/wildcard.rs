use ledger_domain::{AccountKind, AccountPath, SEPARATOR, WILDCARD};

/// Builds the POSIX regex Postgres' `~` operator matches a synthetic
/// account pattern against (spec.md §4.3.3 "the operator (`=` vs
/// prefix-match) is selected from `path.kind()`"). Literal components are
/// regex-escaped; `*` positions become `[^.]+`, anchored so the match is
/// exactly this depth.
pub fn regex_pattern(path: &AccountPath) -> String {
    let parts: Vec<String> = path
        .components()
        .iter()
        .map(|c| {
            if c == WILDCARD {
                "[^.]+".to_string()
            } else {
                regex_escape(c)
            }
        })
        .collect();

    format!("^{}$", parts.join(&format!("\\{SEPARATOR}")))
}

/// The SQL comparison operator for an account query: `=` for an analytic
/// (exact) path, `~` (POSIX regex match) for a synthetic pattern.
pub fn operator_for(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Analytic => "=",
        AccountKind::Synthetic => "~",
    }
}

/// The right-hand side value to bind alongside `operator_for`: the literal
/// path value for analytic, the compiled regex for synthetic.
pub fn match_value(path: &AccountPath) -> String {
    match path.kind() {
        AccountKind::Analytic => path.value().to_string(),
        AccountKind::Synthetic => regex_pattern(path),
    }
}

fn regex_escape(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                format!("\\{c}")
            }
            other => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_anchored_regex_for_single_wildcard() {
        let path = AccountPath::parse("liability.clients.*").unwrap();
        assert_eq!(regex_pattern(&path), r"^liability\.clients\.[^.]+$");
    }

    #[test]
    fn analytic_uses_equality_operator() {
        let path = AccountPath::parse("liability.clients.user_1").unwrap();
        assert_eq!(operator_for(path.kind()), "=");
        assert_eq!(match_value(&path), "liability.clients.user_1");
    }

    #[test]
    fn synthetic_uses_regex_operator() {
        let path = AccountPath::parse("liability.*.user_1").unwrap();
        assert_eq!(operator_for(path.kind()), "~");
        assert_eq!(match_value(&path), r"^liability\.[^.]+\.user_1$");
    }
}
