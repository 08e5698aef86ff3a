use crate::{RightDefinition, SidType, UserRight};
use core::fmt::{self, Display};

/// Result of a reverse lookup: who a SID belongs to.
///
/// This is also the value stored in the [`SidCache`](crate::SidCache).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccountLookup {
    /// Domain the account belongs to; empty for some well-known SIDs.
    pub domain: String,
    /// Account name.
    pub name: String,
    /// Classification reported by the lookup.
    pub sid_type: SidType,
}

impl AccountLookup {
    /// Builds a lookup result.
    #[inline]
    #[must_use]
    pub fn new<D: Into<String>, N: Into<String>>(domain: D, name: N, sid_type: SidType) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            sid_type,
        }
    }

    /// `domain\name`, or `name` when the domain is empty.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.domain.is_empty() {
            self.name.clone()
        } else {
            format!("{}\\{}", self.domain, self.name)
        }
    }
}

/// One account holding a right.
///
/// `sid` is the canonical text form and is always populated when the native
/// SID was present. `domain` and `name` are absent when reverse lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Principal {
    /// Canonical SID text (`S-1-5-...`).
    pub sid: String,
    /// Domain part of the account name.
    pub domain: Option<String>,
    /// Account name.
    pub name: Option<String>,
    /// Classification of the SID.
    pub sid_type: SidType,
}

impl Principal {
    /// A principal known only by its SID.
    #[inline]
    #[must_use]
    pub fn from_sid<S: Into<String>>(sid: S) -> Self {
        Self {
            sid: sid.into(),
            ..Self::default()
        }
    }

    /// Fully qualified display name: `domain\name`, else `name`, else the SID text.
    ///
    /// # Examples
    /// ```rust
    /// # use win_user_rights::{Principal, SidType};
    /// let p = Principal {
    ///     sid: "S-1-5-32-544".to_owned(),
    ///     domain: Some("BUILTIN".to_owned()),
    ///     name: Some("Administrators".to_owned()),
    ///     sid_type: SidType::Alias,
    /// };
    /// assert_eq!(p.account_name(), "BUILTIN\\Administrators");
    /// assert_eq!(p.to_string(), "BUILTIN\\Administrators (S-1-5-32-544)");
    /// ```
    #[must_use]
    pub fn account_name(&self) -> String {
        match (self.domain.as_deref(), self.name.as_deref()) {
            (Some(domain), Some(name)) if !domain.is_empty() => format!("{domain}\\{name}"),
            (_, Some(name)) if !name.is_empty() => name.to_owned(),
            _ => self.sid.clone(),
        }
    }

    /// `true` when a name was resolved for the SID.
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Fills in what a lookup knows: non-empty names, and the classification
    /// only if the current one is unresolved.
    pub(crate) fn apply_lookup(&mut self, lookup: AccountLookup) {
        if !lookup.name.is_empty() {
            self.name = Some(lookup.name);
        }
        if !lookup.domain.is_empty() {
            self.domain = Some(lookup.domain);
        }
        if self.sid_type.is_unresolved() {
            self.sid_type = lookup.sid_type;
        }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_resolved() {
            write!(f, "{} ({})", self.account_name(), self.sid)
        } else {
            f.write_str(&self.sid)
        }
    }
}

/// A right together with its catalog entry and current holders.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RightState {
    /// The right.
    pub right: UserRight,
    /// LSA constant name.
    pub short_name: String,
    /// Group Policy display name.
    pub display_name: String,
    /// What holding the right allows.
    pub description: String,
    /// Current holders, in enumeration order.
    pub principals: Vec<Principal>,
}

impl RightState {
    /// Joins a catalog entry with the enumerated holders.
    #[must_use]
    pub fn new(definition: &RightDefinition, principals: Vec<Principal>) -> Self {
        Self {
            right: definition.right,
            short_name: definition.short_name.to_owned(),
            display_name: definition.display_name.to_owned(),
            description: definition.description.to_owned(),
            principals,
        }
    }

    /// Number of holders.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.principals.len()
    }
}

impl Display for RightState {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) : {} principals",
            self.display_name,
            self.short_name,
            self.count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_name_fallbacks() {
        let mut p = Principal::from_sid("S-1-1-0");
        assert_eq!(p.account_name(), "S-1-1-0");
        assert_eq!(p.to_string(), "S-1-1-0");

        p.name = Some("Everyone".to_owned());
        p.domain = Some(String::new());
        assert_eq!(p.account_name(), "Everyone");
        assert_eq!(p.to_string(), "Everyone (S-1-1-0)");

        p.domain = Some("WORLD".to_owned());
        assert_eq!(p.account_name(), "WORLD\\Everyone");
    }

    #[test]
    fn apply_lookup_drops_empty_parts() {
        let mut p = Principal::from_sid("S-1-1-0");
        p.apply_lookup(AccountLookup::new("", "Everyone", SidType::KnownGroup));
        assert_eq!(p.domain, None);
        assert_eq!(p.name.as_deref(), Some("Everyone"));
        assert_eq!(p.sid_type, SidType::KnownGroup);
    }

    #[test]
    fn apply_lookup_keeps_a_resolved_type() {
        let mut p = Principal {
            sid: "S-1-5-21-1-2-3-1001".to_owned(),
            domain: Some("CORP".to_owned()),
            name: None,
            sid_type: SidType::User,
        };
        p.apply_lookup(AccountLookup::new("", "alice", SidType::DeletedAccount));
        assert_eq!(p.account_name(), "CORP\\alice");
        assert_eq!(p.sid_type, SidType::User);
    }

    #[test]
    fn qualified_lookup_name() {
        assert_eq!(
            AccountLookup::new("NT AUTHORITY", "SYSTEM", SidType::KnownGroup).qualified_name(),
            "NT AUTHORITY\\SYSTEM"
        );
        assert_eq!(
            AccountLookup::new("", "Everyone", SidType::KnownGroup).qualified_name(),
            "Everyone"
        );
    }

    #[test]
    fn right_state_summary() {
        let state = RightState::new(
            UserRight::SeServiceLogonRight.definition(),
            vec![Principal::from_sid("S-1-5-80-0")],
        );
        assert_eq!(state.count(), 1);
        assert_eq!(
            state.to_string(),
            "Log on as a service (SeServiceLogonRight) : 1 principals"
        );
    }
}
