use super::{LookupReply, PolicyBackend, TranslatedName};
use crate::identity::AccountNameLookup;
use crate::{AccountLookup, NtStatus, PinnedSid, SecurityIdentifier, SidType, UserRight};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Backend operations, for failure injection and call counting on [`MemoryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`PolicyBackend::accounts_with_right`]
    Enumerate,
    /// [`PolicyBackend::lookup_sids`]
    LookupSids,
    /// [`PolicyBackend::lookup_account_sid`]
    LookupAccountSid,
    /// [`AccountNameLookup::lookup_account_name`]
    LookupAccountName,
    /// [`PolicyBackend::add_account_right`]
    Add,
    /// [`PolicyBackend::remove_account_right`]
    Remove,
    /// [`PolicyBackend::close`]
    Close,
}

#[derive(Debug, Clone)]
struct Account {
    domain: String,
    name: String,
    sid: SecurityIdentifier,
    sid_type: SidType,
}

impl Account {
    fn matches(&self, input: &str) -> bool {
        match input.split_once('\\') {
            Some((domain, name)) => {
                domain.eq_ignore_ascii_case(&self.domain) && name.eq_ignore_ascii_case(&self.name)
            }
            None => input.eq_ignore_ascii_case(&self.name),
        }
    }
}

#[derive(Debug)]
struct Store {
    grants: BTreeMap<String, Vec<SecurityIdentifier>>,
    accounts: Vec<Account>,
    failures: HashMap<Operation, NtStatus>,
    calls: HashMap<Operation, usize>,
    bulk_lookup: bool,
}

impl Store {
    /// Counts the call and returns the injected failure, if any.
    fn enter(&mut self, op: Operation) -> Option<NtStatus> {
        *self.calls.entry(op).or_default() += 1;
        self.failures.get(&op).copied()
    }

    fn account(&self, sid: &SecurityIdentifier) -> Option<&Account> {
        self.accounts.iter().find(|a| a.sid == *sid)
    }
}

/// In-process policy store.
///
/// Behaves like the LSA for the operations the client uses: unknown right
/// names fail with `NO_SUCH_PRIVILEGE`, an empty right enumerates as
/// `NO_MORE_ENTRIES`, and removing a grant that does not exist reports
/// `OBJECT_NAME_NOT_FOUND`. Clones share the same store, so several clients
/// can act on one "machine".
///
/// # Examples
/// ```rust
/// # use win_user_rights::{MemoryPolicy, PolicyClient, SidCache, SidType, UserRight};
/// # use std::sync::Arc;
/// let store = MemoryPolicy::new().with_account(
///     "BUILTIN",
///     "Administrators",
///     "S-1-5-32-544".parse().unwrap(),
///     SidType::Alias,
/// );
/// let client = PolicyClient::with_cache(store.clone(), Arc::new(SidCache::default()));
/// client.grant("BUILTIN\\Administrators", UserRight::SeDebugPrivilege).unwrap();
/// assert_eq!(store.holders(UserRight::SeDebugPrivilege), ["S-1-5-32-544"]);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryPolicy {
    store: Arc<Mutex<Store>>,
}

impl MemoryPolicy {
    /// An empty store with no accounts and no grants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(Store {
                grants: BTreeMap::new(),
                accounts: Vec::new(),
                failures: HashMap::new(),
                calls: HashMap::new(),
                bulk_lookup: true,
            })),
        }
    }

    /// Registers an account that name and SID lookups can find.
    #[must_use]
    pub fn with_account(
        self,
        domain: &str,
        name: &str,
        sid: SecurityIdentifier,
        sid_type: SidType,
    ) -> Self {
        self.store.lock().accounts.push(Account {
            domain: domain.to_owned(),
            name: name.to_owned(),
            sid,
            sid_type,
        });
        self
    }

    /// Seeds a grant without going through the client.
    #[must_use]
    pub fn with_grant(self, right: UserRight, sid: SecurityIdentifier) -> Self {
        {
            let mut store = self.store.lock();
            let holders = store.grants.entry(right.short_name().to_owned()).or_default();
            if !holders.contains(&sid) {
                holders.push(sid);
            }
        }
        self
    }

    /// SID text of every holder of `right`, in grant order.
    #[must_use]
    pub fn holders(&self, right: UserRight) -> Vec<String> {
        self.store
            .lock()
            .grants
            .get(right.short_name())
            .map(|sids| sids.iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Makes every later call of `op` fail with `status`.
    pub fn fail_with(&self, op: Operation, status: NtStatus) {
        self.store.lock().failures.insert(op, status);
    }

    /// Undoes [`MemoryPolicy::fail_with`].
    pub fn clear_failure(&self, op: Operation) {
        self.store.lock().failures.remove(&op);
    }

    /// When disabled, bulk lookups map nothing and callers must fall back to single lookups.
    pub fn set_bulk_lookup(&self, enabled: bool) {
        self.store.lock().bulk_lookup = enabled;
    }

    /// How many times `op` has been called.
    #[must_use]
    pub fn calls(&self, op: Operation) -> usize {
        self.store.lock().calls.get(&op).copied().unwrap_or(0)
    }
}

impl Default for MemoryPolicy {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

fn known_right(right: &str) -> Result<(), NtStatus> {
    right
        .parse::<UserRight>()
        .map(drop)
        .map_err(|_| NtStatus::NO_SUCH_PRIVILEGE)
}

impl AccountNameLookup for MemoryPolicy {
    fn lookup_account_name(&self, name: &str) -> Option<SecurityIdentifier> {
        let mut store = self.store.lock();
        if store.enter(Operation::LookupAccountName).is_some() {
            return None;
        }
        store
            .accounts
            .iter()
            .find(|a| a.matches(name))
            .map(|a| a.sid.clone())
    }
}

impl PolicyBackend for MemoryPolicy {
    fn accounts_with_right(&self, right: &str) -> Result<Vec<Option<SecurityIdentifier>>, NtStatus> {
        let mut store = self.store.lock();
        if let Some(status) = store.enter(Operation::Enumerate) {
            return Err(status);
        }
        known_right(right)?;
        match store.grants.get(right) {
            Some(sids) if !sids.is_empty() => Ok(sids.iter().cloned().map(Some).collect()),
            _ => Err(NtStatus::NO_MORE_ENTRIES),
        }
    }

    fn lookup_sids(&self, sids: &[SecurityIdentifier]) -> Result<LookupReply, NtStatus> {
        let mut store = self.store.lock();
        if let Some(status) = store.enter(Operation::LookupSids) {
            return Err(status);
        }
        if !store.bulk_lookup {
            return Err(NtStatus::NONE_MAPPED);
        }
        let mut reply = LookupReply::default();
        for sid in sids {
            let entry = match store.account(sid) {
                Some(account) => {
                    let index = match reply.domains.iter().position(|d| *d == account.domain) {
                        Some(index) => index,
                        None => {
                            reply.domains.push(account.domain.clone());
                            reply.domains.len() - 1
                        }
                    };
                    TranslatedName {
                        sid_type: account.sid_type,
                        name: account.name.clone(),
                        domain_index: i32::try_from(index).unwrap_or(-1),
                    }
                }
                None => TranslatedName::unmapped(),
            };
            reply.names.push(entry);
        }
        if !sids.is_empty() && reply.names.iter().all(|n| n.name.is_empty()) {
            return Err(NtStatus::NONE_MAPPED);
        }
        Ok(reply)
    }

    fn lookup_account_sid(&self, sid: &SecurityIdentifier) -> Option<AccountLookup> {
        let mut store = self.store.lock();
        if store.enter(Operation::LookupAccountSid).is_some() {
            return None;
        }
        store
            .account(sid)
            .map(|a| AccountLookup::new(a.domain.clone(), a.name.clone(), a.sid_type))
    }

    fn add_account_right(&mut self, sid: &PinnedSid, right: &str) -> NtStatus {
        let mut store = self.store.lock();
        if let Some(status) = store.enter(Operation::Add) {
            return status;
        }
        if sid.as_ptr().is_err() {
            return NtStatus::INVALID_PARAMETER;
        }
        if let Err(status) = known_right(right) {
            return status;
        }
        let holders = store.grants.entry(right.to_owned()).or_default();
        if !holders.contains(sid.sid()) {
            holders.push(sid.sid().clone());
        }
        NtStatus::SUCCESS
    }

    fn remove_account_right(&mut self, sid: &PinnedSid, right: &str) -> NtStatus {
        let mut store = self.store.lock();
        if let Some(status) = store.enter(Operation::Remove) {
            return status;
        }
        if sid.as_ptr().is_err() {
            return NtStatus::INVALID_PARAMETER;
        }
        if let Err(status) = known_right(right) {
            return status;
        }
        let Some(holders) = store.grants.get_mut(right) else {
            return NtStatus::OBJECT_NAME_NOT_FOUND;
        };
        match holders.iter().position(|s| s == sid.sid()) {
            Some(index) => {
                holders.remove(index);
                NtStatus::SUCCESS
            }
            None => NtStatus::OBJECT_NAME_NOT_FOUND,
        }
    }

    fn close(&mut self) -> NtStatus {
        self.store
            .lock()
            .enter(Operation::Close)
            .unwrap_or(NtStatus::SUCCESS)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    fn sid(text: &str) -> SecurityIdentifier {
        text.parse().unwrap()
    }

    fn store() -> MemoryPolicy {
        MemoryPolicy::new()
            .with_account("BUILTIN", "Administrators", sid("S-1-5-32-544"), SidType::Alias)
            .with_account("BUILTIN", "Users", sid("S-1-5-32-545"), SidType::Alias)
            .with_account("", "Everyone", sid("S-1-1-0"), SidType::KnownGroup)
    }

    #[test]
    fn name_lookup_is_case_insensitive() {
        let store = store();
        assert_eq!(
            store.lookup_account_name("builtin\\administrators"),
            Some(sid("S-1-5-32-544"))
        );
        assert_eq!(store.lookup_account_name("Users"), Some(sid("S-1-5-32-545")));
        assert_eq!(store.lookup_account_name("OTHER\\Users"), None);
    }

    #[test]
    fn empty_right_enumerates_as_no_more_entries() {
        assert_eq!(
            store().accounts_with_right("SeDebugPrivilege"),
            Err(NtStatus::NO_MORE_ENTRIES)
        );
        assert_eq!(
            store().accounts_with_right("SeNotARight"),
            Err(NtStatus::NO_SUCH_PRIVILEGE)
        );
    }

    #[test]
    fn add_and_remove() {
        let mut store = store();
        let pinned = PinnedSid::new(sid("S-1-5-32-545"));
        assert_eq!(store.add_account_right(&pinned, "SeBatchLogonRight"), NtStatus::SUCCESS);
        assert_eq!(store.add_account_right(&pinned, "SeBatchLogonRight"), NtStatus::SUCCESS);
        assert_eq!(store.holders(UserRight::SeBatchLogonRight), ["S-1-5-32-545"]);
        assert_eq!(store.remove_account_right(&pinned, "SeBatchLogonRight"), NtStatus::SUCCESS);
        assert_eq!(
            store.remove_account_right(&pinned, "SeBatchLogonRight"),
            NtStatus::OBJECT_NAME_NOT_FOUND
        );
        assert_eq!(store.calls(Operation::Add), 2);
        assert_eq!(store.calls(Operation::Remove), 2);
    }

    #[test]
    fn released_sid_is_rejected() {
        let mut store = store();
        let mut pinned = PinnedSid::new(sid("S-1-5-32-545"));
        pinned.release();
        assert_eq!(
            store.add_account_right(&pinned, "SeBatchLogonRight"),
            NtStatus::INVALID_PARAMETER
        );
    }

    #[test]
    fn bulk_lookup_builds_a_shared_domain_table() {
        let reply = store()
            .lookup_sids(&[sid("S-1-5-32-544"), sid("S-1-5-21-9"), sid("S-1-5-32-545")])
            .unwrap();
        assert_eq!(reply.domains, ["BUILTIN"]);
        assert_eq!(reply.names[0].name, "Administrators");
        assert_eq!(reply.names[0].domain_index, 0);
        assert_eq!(reply.names[1], TranslatedName::unmapped());
        assert_eq!(reply.names[2].domain_index, 0);
    }

    #[test]
    fn nothing_mapped() {
        assert_eq!(
            store().lookup_sids(&[sid("S-1-5-21-9")]),
            Err(NtStatus::NONE_MAPPED)
        );
        let store = store();
        store.set_bulk_lookup(false);
        assert_eq!(
            store.lookup_sids(&[sid("S-1-5-32-544")]),
            Err(NtStatus::NONE_MAPPED)
        );
    }

    #[test]
    fn injected_failures() {
        let mut store = store();
        store.fail_with(Operation::Add, NtStatus::ACCESS_DENIED);
        let pinned = PinnedSid::new(sid("S-1-1-0"));
        assert_eq!(store.add_account_right(&pinned, "SeDebugPrivilege"), NtStatus::ACCESS_DENIED);
        store.clear_failure(Operation::Add);
        assert_eq!(store.add_account_right(&pinned, "SeDebugPrivilege"), NtStatus::SUCCESS);
        store.fail_with(Operation::Close, NtStatus::INVALID_HANDLE);
        assert_eq!(store.close(), NtStatus::INVALID_HANDLE);
    }

    #[test]
    fn clones_share_the_store() {
        let store = store().with_grant(UserRight::SeShutdownPrivilege, sid("S-1-5-32-544"));
        let other = store.clone();
        assert_eq!(other.holders(UserRight::SeShutdownPrivilege), ["S-1-5-32-544"]);
    }
}
