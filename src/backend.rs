//! The native seam: everything that talks to a policy store goes through [`PolicyBackend`].
//!
//! Backends report raw [`NtStatus`] values; turning them into [`Error`](crate::Error)s
//! is the job of [`PolicyClient`](crate::PolicyClient).

use crate::identity::AccountNameLookup;
use crate::{AccountLookup, NtStatus, PinnedSid, SecurityIdentifier, SidType};

#[cfg(windows)]
mod lsa;
mod memory;

#[cfg(windows)]
pub use lsa::LsaPolicy;
pub use memory::{MemoryPolicy, Operation};

/// One entry of a bulk SID → name translation (`LSA_TRANSLATED_NAME`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslatedName {
    /// Classification of the SID.
    pub sid_type: SidType,
    /// Account name, empty when unmapped.
    pub name: String,
    /// Index into [`LookupReply::domains`], negative when there is none.
    pub domain_index: i32,
}

impl TranslatedName {
    /// Entry for a SID that could not be translated.
    #[inline]
    #[must_use]
    pub const fn unmapped() -> Self {
        Self {
            sid_type: SidType::Unknown,
            name: String::new(),
            domain_index: -1,
        }
    }
}

/// Reply of a bulk SID lookup: parallel to the input, plus the referenced domain table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LookupReply {
    /// One entry per looked-up SID, in input order.
    pub names: Vec<TranslatedName>,
    /// Names of the domains referenced by [`TranslatedName::domain_index`].
    pub domains: Vec<String>,
}

/// Operations a policy store must provide.
///
/// Reads take `&self`; writes and `close` take `&mut self` because the
/// client only calls them under its exclusive lock.
pub trait PolicyBackend: AccountNameLookup + Send + Sync {
    /// SIDs of the accounts holding `right`, `None` for a null native SID.
    ///
    /// # Errors
    /// The failing status. `NO_MORE_ENTRIES` means no account holds the right.
    fn accounts_with_right(&self, right: &str) -> Result<Vec<Option<SecurityIdentifier>>, NtStatus>;

    /// Translates many SIDs at once.
    ///
    /// Partially mapped replies are `Ok`.
    ///
    /// # Errors
    /// The failing status, `NONE_MAPPED` included.
    fn lookup_sids(&self, sids: &[SecurityIdentifier]) -> Result<LookupReply, NtStatus>;

    /// Reverse lookup of a single SID against the target system.
    fn lookup_account_sid(&self, sid: &SecurityIdentifier) -> Option<AccountLookup>;

    /// Grants `right` to the pinned SID.
    fn add_account_right(&mut self, sid: &PinnedSid, right: &str) -> NtStatus;

    /// Removes `right` from the pinned SID.
    fn remove_account_right(&mut self, sid: &PinnedSid, right: &str) -> NtStatus;

    /// Releases the underlying handle. Called at most once.
    fn close(&mut self) -> NtStatus;
}
