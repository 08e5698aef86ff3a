//! High-level entry point tying the client, the catalog and reconciliation together.

use crate::backend::PolicyBackend;
use crate::reconcile::{SetResult, reconcile};
use crate::{Error, PolicyClient, Principal, RightState, UserRight};
use std::collections::BTreeMap;

/// User Rights Assignment over one policy client.
///
/// # Examples
/// ```rust
/// # use win_user_rights::{MemoryPolicy, PolicyClient, SidType, UserRight, UserRights};
/// let store = MemoryPolicy::new().with_account(
///     "NT AUTHORITY",
///     "SYSTEM",
///     "S-1-5-18".parse().unwrap(),
///     SidType::KnownGroup,
/// );
/// let rights = UserRights::with_client(PolicyClient::new(store));
/// let result = rights.set(UserRight::SeServiceLogonRight, &["NT AUTHORITY\\SYSTEM"]).unwrap();
/// assert_eq!(result.to_string(), "SeServiceLogonRight: +1 -0");
/// assert_eq!(rights.state(UserRight::SeServiceLogonRight).unwrap().count(), 1);
/// ```
#[derive(Debug)]
pub struct UserRights<B: PolicyBackend> {
    client: PolicyClient<B>,
}

impl<B: PolicyBackend> UserRights<B> {
    /// Wraps an existing client.
    #[inline]
    #[must_use]
    pub const fn with_client(client: PolicyClient<B>) -> Self {
        Self { client }
    }

    /// The underlying client.
    #[inline]
    #[must_use]
    pub const fn client(&self) -> &PolicyClient<B> {
        &self.client
    }

    /// Current holders of `right`.
    ///
    /// # Errors
    /// See [`PolicyClient::enumerate_principals`].
    #[inline]
    pub fn principals(&self, right: UserRight) -> Result<Vec<Principal>, Error> {
        self.client.enumerate_principals(right)
    }

    /// `right` with its catalog entry and current holders.
    ///
    /// # Errors
    /// See [`PolicyClient::enumerate_principals`].
    #[inline]
    pub fn state(&self, right: UserRight) -> Result<RightState, Error> {
        let principals = self.principals(right)?;
        Ok(RightState::new(right.definition(), principals))
    }

    /// State of every catalogued right, in catalog order.
    ///
    /// # Errors
    /// The first enumeration failure.
    pub fn enumerate(&self) -> Result<Vec<RightState>, Error> {
        UserRight::ALL.iter().map(|&right| self.state(right)).collect()
    }

    /// [`enumerate`](Self::enumerate) keyed by right.
    ///
    /// # Errors
    /// The first enumeration failure.
    pub fn by_right(&self) -> Result<BTreeMap<UserRight, RightState>, Error> {
        UserRight::ALL
            .iter()
            .map(|&right| self.state(right).map(|state| (right, state)))
            .collect()
    }

    /// [`enumerate`](Self::enumerate) keyed by LSA short name.
    ///
    /// # Errors
    /// The first enumeration failure.
    pub fn by_short_name(&self) -> Result<BTreeMap<String, RightState>, Error> {
        UserRight::ALL
            .iter()
            .map(|&right| {
                self.state(right)
                    .map(|state| (right.short_name().to_owned(), state))
            })
            .collect()
    }

    /// Grants `right` to each principal in turn, stopping at the first failure.
    ///
    /// # Errors
    /// See [`PolicyClient::grant`].
    pub fn add<I>(&self, right: UserRight, principals: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        principals
            .into_iter()
            .try_for_each(|p| self.client.grant(p.as_ref(), right))
    }

    /// Removes `right` from each principal in turn, stopping at the first failure.
    ///
    /// # Errors
    /// See [`PolicyClient::revoke`].
    pub fn remove<I>(&self, right: UserRight, principals: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        principals
            .into_iter()
            .try_for_each(|p| self.client.revoke(p.as_ref(), right))
    }

    /// Makes the holders of `right` exactly `desired`.
    ///
    /// # Errors
    /// See [`reconcile`].
    #[inline]
    pub fn set<S: AsRef<str>>(&self, right: UserRight, desired: &[S]) -> Result<SetResult, Error> {
        reconcile(&self.client, right, desired, None)
    }

    /// Like [`set`](Self::set), diffing against a snapshot the caller already holds.
    ///
    /// # Errors
    /// See [`reconcile`].
    #[inline]
    pub fn set_with_snapshot<S: AsRef<str>>(
        &self,
        right: UserRight,
        desired: &[S],
        existing: &[Principal],
    ) -> Result<SetResult, Error> {
        reconcile(&self.client, right, desired, Some(existing))
    }

    /// Releases the policy handle. See [`PolicyClient::dispose`].
    #[inline]
    pub fn dispose(&self) {
        self.client.dispose();
    }
}

#[cfg(windows)]
impl UserRights<crate::LsaPolicy> {
    /// Opens the policy of `system_name`, or of the local machine when `None` or empty.
    ///
    /// # Errors
    /// See [`PolicyClient::open`].
    #[inline]
    pub fn open(system_name: Option<&str>) -> Result<Self, Error> {
        let options = match system_name {
            Some(name) => crate::ClientOptions::DEFAULT.with_system_name(name),
            None => crate::ClientOptions::DEFAULT,
        };
        PolicyClient::open(&options).map(Self::with_client)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use crate::{MemoryPolicy, SidCache, SidType};
    use std::sync::Arc;

    fn rights(store: &MemoryPolicy) -> UserRights<MemoryPolicy> {
        UserRights::with_client(PolicyClient::with_cache(
            store.clone(),
            Arc::new(SidCache::default()),
        ))
    }

    #[test]
    fn enumerate_covers_the_catalog() {
        let store = MemoryPolicy::new()
            .with_grant(UserRight::SeDebugPrivilege, "S-1-5-32-544".parse().unwrap());
        let rights = rights(&store);

        let all = rights.enumerate().unwrap();
        assert_eq!(all.len(), UserRight::ALL.len());
        assert!(all.iter().zip(UserRight::ALL).all(|(s, r)| s.right == *r));

        let by_name = rights.by_short_name().unwrap();
        assert_eq!(by_name["SeDebugPrivilege"].count(), 1);
        let by_right = rights.by_right().unwrap();
        assert_eq!(by_right[&UserRight::SeDebugPrivilege].principals[0].sid, "S-1-5-32-544");
        assert_eq!(by_right[&UserRight::SeTcbPrivilege].count(), 0);
    }

    #[test]
    fn add_then_remove() {
        let store = MemoryPolicy::new().with_account(
            "BUILTIN",
            "Users",
            "S-1-5-32-545".parse().unwrap(),
            SidType::Alias,
        );
        let rights = rights(&store);
        rights
            .add(UserRight::SeBatchLogonRight, ["BUILTIN\\Users", "S-1-5-19"])
            .unwrap();
        assert_eq!(
            store.holders(UserRight::SeBatchLogonRight),
            ["S-1-5-32-545", "S-1-5-19"]
        );
        rights
            .remove(UserRight::SeBatchLogonRight, vec!["S-1-5-19".to_owned()])
            .unwrap();
        assert_eq!(
            rights
                .state(UserRight::SeBatchLogonRight)
                .unwrap()
                .principals[0]
                .account_name(),
            "BUILTIN\\Users"
        );
    }

    #[test]
    fn add_stops_at_the_first_failure() {
        let store = MemoryPolicy::new();
        let rights = rights(&store);
        assert_eq!(
            rights.add(UserRight::SeBatchLogonRight, ["S-1-5-19", "nobody", "S-1-5-20"]),
            Err(Error::UnresolvedIdentity("nobody".to_owned()))
        );
        assert_eq!(store.holders(UserRight::SeBatchLogonRight), ["S-1-5-19"]);
    }

    #[test]
    fn dispose_reaches_the_client() {
        let rights = rights(&MemoryPolicy::new());
        rights.dispose();
        assert!(rights.client().is_disposed());
        assert_eq!(rights.enumerate(), Err(Error::Disposed));
    }
}
