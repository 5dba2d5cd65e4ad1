use crate::account_path::AccountPath;
use crate::error::DomainError;
use crate::version::Version;

/// Sentinel `current_version` reported for synthetic (aggregated) balances,
/// which have no single version-coherent view (spec.md §3).
pub const SYNTHETIC_CURRENT_VERSION: i64 = -1;

/// Balance for a single analytic account or an aggregated synthetic query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub account: String,
    /// `None` for synthetic results; serialized as `-1` at the wire boundary.
    pub current_version: Option<Version>,
    pub balance: i64,
}

impl AccountBalance {
    pub fn analytic(account: &AccountPath, current_version: Version, balance: i64) -> Self {
        AccountBalance {
            account: account.value().to_string(),
            current_version: Some(current_version),
            balance,
        }
    }

    pub fn synthetic(account: &AccountPath, balance: i64) -> Self {
        AccountBalance {
            account: account.value().to_string(),
            current_version: None,
            balance,
        }
    }

    /// Serializes `current_version` to its wire form, `-1` for synthetic.
    pub fn current_version_wire(&self) -> i64 {
        self.current_version
            .map(Version::to_wire)
            .unwrap_or(SYNTHETIC_CURRENT_VERSION)
    }
}

/// One row of a [`SyntheticReport`]: credit/debit totals for a single
/// account group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountResult {
    pub account: String,
    pub credit: i64,
    pub debit: i64,
}

/// Aggregated credit/debit rollup across a set of account groups
/// (spec.md §4.3.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticReport {
    pub total_credit: i64,
    pub total_debit: i64,
    pub results: Vec<AccountResult>,
}

impl SyntheticReport {
    /// Builds a report, validating that the totals equal the sum of the
    /// per-group results (spec.md §3 "AccountResult / SyntheticReport"
    /// invariant).
    pub fn new(
        total_credit: i64,
        total_debit: i64,
        results: Vec<AccountResult>,
    ) -> Result<Self, DomainError> {
        let sum_credit: i64 = results.iter().map(|r| r.credit).sum();
        let sum_debit: i64 = results.iter().map(|r| r.debit).sum();

        if sum_credit != total_credit || sum_debit != total_debit {
            return Err(DomainError::Internal(format!(
                "synthetic report totals ({total_credit}, {total_debit}) do not match \
                 per-group sums ({sum_credit}, {sum_debit})"
            )));
        }

        Ok(SyntheticReport {
            total_credit,
            total_debit,
            results,
        })
    }

    pub fn empty() -> Self {
        SyntheticReport {
            total_credit: 0,
            total_debit: 0,
            results: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_report_when_totals_match() {
        let results = vec![
            AccountResult {
                account: "assets.bacen.conta_liquidacao".into(),
                credit: 200,
                debit: 300,
            },
        ];
        let report = SyntheticReport::new(200, 300, results).unwrap();
        assert_eq!(report.results.len(), 1);
    }

    #[test]
    fn rejects_mismatched_totals() {
        let results = vec![AccountResult {
            account: "a.b.c".into(),
            credit: 10,
            debit: 0,
        }];
        assert!(SyntheticReport::new(999, 0, results).is_err());
    }

    #[test]
    fn empty_report_has_zero_totals() {
        let report = SyntheticReport::empty();
        assert_eq!(report.total_credit, 0);
        assert_eq!(report.total_debit, 0);
        assert!(report.results.is_empty());
    }

    #[test]
    fn synthetic_balance_serializes_sentinel_version() {
        let account = AccountPath::parse("liability.clients.*").unwrap();
        let balance = AccountBalance::synthetic(&account, 42);
        assert_eq!(balance.current_version_wire(), -1);
    }
}
