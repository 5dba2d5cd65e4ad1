use crate::error::DomainError;

/// Per-account monotonic version used for optimistic concurrency.
///
/// The wire and storage layer persist this as a signed 64-bit integer with
/// two negative sentinels (`-2` = storage assigns next, `-1` = does not
/// advance the counter). This type keeps those sentinels out of the concrete
/// value space at the domain layer; conversion to/from `i64` only happens at
/// the storage boundary (see `ledger-storage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// A concrete, caller-supplied expected version (optimistic lock).
    Concrete(u64),
    /// Storage assigns the next version for this account.
    Next,
    /// This entry does not participate in the account's version counter.
    Ignore,
}

const NEXT_VERSION_WIRE: i64 = -2;
const IGNORE_VERSION_WIRE: i64 = -1;

impl Version {
    /// Parses the wire representation, rejecting negative values other than
    /// the two sentinels.
    pub fn from_wire(raw: i64) -> Result<Self, DomainError> {
        match raw {
            NEXT_VERSION_WIRE => Ok(Version::Next),
            IGNORE_VERSION_WIRE => Ok(Version::Ignore),
            v if v < 0 => Err(DomainError::InvalidVersion),
            v => Ok(Version::Concrete(v as u64)),
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            Version::Concrete(v) => v as i64,
            Version::Next => NEXT_VERSION_WIRE,
            Version::Ignore => IGNORE_VERSION_WIRE,
        }
    }

    pub fn is_sentinel(self) -> bool {
        !matches!(self, Version::Concrete(_))
    }
}

/// Canonical-order key for `Version`: sentinels sort greater than any
/// concrete version (spec.md §3, §9 "Canonical entry sort"). This keeps the
/// deadlock-avoidance ordering stable when entries mix concrete and
/// sentinel-valued expected versions on the same account.
impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Version::Concrete(a), Version::Concrete(b)) => a.cmp(b),
            (Version::Concrete(_), _) => std::cmp::Ordering::Less,
            (_, Version::Concrete(_)) => std::cmp::Ordering::Greater,
            _ => std::cmp::Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_concrete() {
        let v = Version::from_wire(7).unwrap();
        assert_eq!(v, Version::Concrete(7));
        assert_eq!(v.to_wire(), 7);
    }

    #[test]
    fn round_trips_sentinels() {
        assert_eq!(Version::from_wire(-2).unwrap(), Version::Next);
        assert_eq!(Version::from_wire(-1).unwrap(), Version::Ignore);
        assert_eq!(Version::Next.to_wire(), -2);
        assert_eq!(Version::Ignore.to_wire(), -1);
    }

    #[test]
    fn rejects_other_negatives() {
        assert_eq!(Version::from_wire(-3), Err(DomainError::InvalidVersion));
    }

    #[test]
    fn sentinels_sort_after_any_concrete_version() {
        let mut versions = vec![Version::Next, Version::Concrete(3), Version::Ignore, Version::Concrete(1)];
        versions.sort();
        assert_eq!(
            versions,
            vec![
                Version::Concrete(1),
                Version::Concrete(3),
                Version::Next,
                Version::Ignore,
            ]
        );
    }
}
