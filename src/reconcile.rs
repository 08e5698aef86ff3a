//! Diff-based reconciliation of a right's membership.

use crate::backend::PolicyBackend;
use crate::{Error, PolicyClient, Principal, SecurityIdentifier, UserRight};
use core::fmt;
use parsing::validate_principal;
use std::collections::HashSet;

/// Outcome of a [`reconcile`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetResult {
    /// The reconciled right.
    pub right: UserRight,
    /// SIDs granted the right, in desired order.
    pub added: Vec<String>,
    /// SIDs the right was removed from, in enumeration order.
    pub removed: Vec<String>,
    /// Desired entries that could not be resolved to a SID.
    pub unresolved: Vec<String>,
}

impl SetResult {
    /// `true` when anything was granted or removed.
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

impl fmt::Display for SetResult {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: +{} -{}",
            self.right,
            self.added.len(),
            self.removed.len()
        )
    }
}

/// The delta between desired and existing SID text, compared ordinally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    /// Desired SIDs not currently holding the right, deduplicated, in desired order.
    pub to_add: Vec<String>,
    /// Current holders not desired, in existing order.
    pub to_remove: Vec<String>,
}

/// Computes the add/remove delta. Existing entries with an empty SID are ignored.
///
/// # Examples
/// ```rust
/// # use win_user_rights::reconcile::plan;
/// let p = plan(["B", "C", "D"], ["A", "B", "C"]);
/// assert_eq!(p.to_add, ["D"]);
/// assert_eq!(p.to_remove, ["A"]);
/// ```
pub fn plan<'a, D, E>(desired: D, existing: E) -> Plan
where
    D: IntoIterator<Item = &'a str>,
    E: IntoIterator<Item = &'a str>,
{
    let existing: Vec<&str> = existing.into_iter().filter(|sid| !sid.is_empty()).collect();
    let existing_set: HashSet<&str> = existing.iter().copied().collect();

    let mut desired_set = HashSet::new();
    let mut to_add = Vec::new();
    for sid in desired {
        if desired_set.insert(sid) && !existing_set.contains(sid) {
            to_add.push(sid.to_owned());
        }
    }

    let mut seen = HashSet::new();
    let to_remove = existing
        .into_iter()
        .filter(|sid| !desired_set.contains(sid) && seen.insert(*sid))
        .map(str::to_owned)
        .collect();

    Plan { to_add, to_remove }
}

/// Canonical text of `sid`, or `sid` unchanged when it does not parse.
fn canonical_sid(sid: &str) -> String {
    sid.parse::<SecurityIdentifier>()
        .map_or_else(|_| sid.to_owned(), |parsed| parsed.to_string())
}

/// Makes the holders of `right` exactly `desired`.
///
/// Every desired entry is validated before any native call. Entries that do
/// not resolve to a SID are reported in [`SetResult::unresolved`] and
/// otherwise ignored. Grants are applied before removals; the first native
/// failure aborts the call, leaving earlier changes in place.
///
/// `existing` may carry a snapshot the caller already holds; when `None` the
/// current holders are enumerated.
///
/// # Errors
/// - [`Error::InvalidPrincipal`] if any desired entry is malformed.
/// - [`Error::Disposed`] or a translated native failure.
pub fn reconcile<B, S>(
    client: &PolicyClient<B>,
    right: UserRight,
    desired: &[S],
    existing: Option<&[Principal]>,
) -> Result<SetResult, Error>
where
    B: PolicyBackend,
    S: AsRef<str>,
{
    for input in desired {
        let input = input.as_ref();
        validate_principal(input).map_err(|reason| Error::InvalidPrincipal {
            input: input.to_owned(),
            reason,
        })?;
    }

    let fetched;
    let existing = match existing {
        Some(snapshot) => snapshot,
        None => {
            fetched = client.enumerate_principals(right)?;
            fetched.as_slice()
        }
    };

    let mut unresolved = Vec::new();
    let mut desired_sids = Vec::with_capacity(desired.len());
    for input in desired {
        let input = input.as_ref();
        match client.resolve(input) {
            Ok(sid) => desired_sids.push(sid.to_string()),
            Err(Error::UnresolvedIdentity(_) | Error::InvalidSidFormat(_)) => {
                log::debug!("{right}: cannot resolve {input:?}");
                unresolved.push(input.to_owned());
            }
            Err(err) => return Err(err),
        }
    }

    let existing_sids: Vec<String> = existing.iter().map(|p| canonical_sid(&p.sid)).collect();
    let Plan { to_add, to_remove } = plan(
        desired_sids.iter().map(String::as_str),
        existing_sids.iter().map(String::as_str),
    );

    for sid in &to_add {
        client.grant(sid, right)?;
    }
    for sid in &to_remove {
        client.revoke(sid, right)?;
    }
    log::debug!("{right}: +{} -{}", to_add.len(), to_remove.len());

    Ok(SetResult {
        right,
        added: to_add,
        removed: to_remove,
        unresolved,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn diff_is_exact() {
        let p = plan(["B", "C", "D"], ["A", "B", "C"]);
        assert_eq!(p.to_add, ["D"]);
        assert_eq!(p.to_remove, ["A"]);
        let p = plan(["D", "C", "B"], ["C", "A", "B"]);
        assert_eq!(p.to_add, ["D"]);
        assert_eq!(p.to_remove, ["A"]);
    }

    #[test]
    fn comparison_is_ordinal() {
        let p = plan(["s-1-1-0"], ["S-1-1-0"]);
        assert_eq!(p.to_add, ["s-1-1-0"]);
        assert_eq!(p.to_remove, ["S-1-1-0"]);
    }

    #[test]
    fn snapshot_text_is_canonicalized() {
        assert_eq!(canonical_sid("s-1-1-0"), "S-1-1-0");
        assert_eq!(canonical_sid("S-1-0x5-18"), "S-1-5-18");
        assert_eq!(canonical_sid(""), "");
        assert_eq!(canonical_sid("not a sid"), "not a sid");
    }

    #[test]
    fn empty_and_duplicate_entries() {
        let p = plan(["S-1-1-0", "S-1-1-0"], ["", "S-1-5-18", "S-1-5-18"]);
        assert_eq!(p.to_add, ["S-1-1-0"]);
        assert_eq!(p.to_remove, ["S-1-5-18"]);
    }

    #[test]
    fn summary() {
        let result = SetResult {
            right: UserRight::SeServiceLogonRight,
            added: vec!["S-1-5-18".to_owned()],
            removed: vec![],
            unresolved: vec!["ghost".to_owned()],
        };
        assert!(result.changed());
        assert_eq!(result.to_string(), "SeServiceLogonRight: +1 -0");
    }

    proptest! {
        #[test]
        fn plan_matches_set_difference(
            desired in proptest::collection::vec(0u8..12, 0..12),
            existing in proptest::collection::vec(0u8..12, 0..12),
        ) {
            let desired: Vec<String> = desired.iter().map(|n| format!("S-1-5-21-{n}")).collect();
            let existing: Vec<String> = existing.iter().map(|n| format!("S-1-5-21-{n}")).collect();
            let p = plan(desired.iter().map(String::as_str), existing.iter().map(String::as_str));

            let d: BTreeSet<&str> = desired.iter().map(String::as_str).collect();
            let e: BTreeSet<&str> = existing.iter().map(String::as_str).collect();
            let add: BTreeSet<&str> = p.to_add.iter().map(String::as_str).collect();
            let remove: BTreeSet<&str> = p.to_remove.iter().map(String::as_str).collect();
            prop_assert_eq!(add.len(), p.to_add.len());
            prop_assert_eq!(remove.len(), p.to_remove.len());
            prop_assert_eq!(add, d.difference(&e).copied().collect::<BTreeSet<_>>());
            prop_assert_eq!(remove, e.difference(&d).copied().collect::<BTreeSet<_>>());
        }
    }
}
