//! The policy client: sole owner of a policy handle.

mod options;

pub use options::{ClientOptions, POLICY_ALL_ACCESS};

use crate::backend::{LookupReply, PolicyBackend};
use crate::decode::join_translated_names;
use crate::status::{check, check_lookup, check_revoke};
use crate::{Error, PinnedSid, Principal, SecurityIdentifier, SidCache, UserRight, identity};
use core::fmt;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use parsing::lsa_byte_len;
use std::sync::Arc;

/// Thread-safe client over one [`PolicyBackend`].
///
/// Enumeration and resolution share a read lock and run concurrently.
/// [`grant`](Self::grant), [`revoke`](Self::revoke) and
/// [`dispose`](Self::dispose) take the write lock. Once disposed, every
/// operation fails with [`Error::Disposed`]; the disposal check happens
/// while the lock is held.
///
/// Dropping the client disposes it, but callers should call
/// [`dispose`](Self::dispose) themselves to release the handle at a known point.
pub struct PolicyClient<B: PolicyBackend> {
    backend: RwLock<Option<B>>,
    cache: Arc<SidCache>,
}

impl<B: PolicyBackend> PolicyClient<B> {
    /// Wraps `backend`, sharing the process-wide [`SidCache::global`].
    #[inline]
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_cache(backend, SidCache::global())
    }

    /// Wraps `backend` with an explicit SID cache.
    #[inline]
    #[must_use]
    pub fn with_cache(backend: B, cache: Arc<SidCache>) -> Self {
        Self {
            backend: RwLock::new(Some(backend)),
            cache,
        }
    }

    /// The SID cache consulted for unresolved names.
    #[inline]
    #[must_use]
    pub const fn cache(&self) -> &Arc<SidCache> {
        &self.cache
    }

    /// `true` once [`dispose`](Self::dispose) has run.
    #[inline]
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.backend.read().is_none()
    }

    fn read(&self) -> Result<MappedRwLockReadGuard<'_, B>, Error> {
        RwLockReadGuard::try_map(self.backend.read(), Option::as_ref).map_err(|_| Error::Disposed)
    }

    fn write(&self) -> Result<MappedRwLockWriteGuard<'_, B>, Error> {
        RwLockWriteGuard::try_map(self.backend.write(), Option::as_mut)
            .map_err(|_| Error::Disposed)
    }

    /// Every account holding `right`, with names resolved where possible.
    ///
    /// Accounts the bulk lookup could not name are looked up in the SID
    /// cache, then individually against the target system; successful
    /// individual lookups are cached.
    ///
    /// # Errors
    /// [`Error::Disposed`], or the translated native failure.
    pub fn enumerate_principals(&self, right: UserRight) -> Result<Vec<Principal>, Error> {
        let backend = self.read()?;
        let right_name = right.short_name();
        lsa_byte_len(right_name)?;

        let sids = match backend.accounts_with_right(right_name) {
            Ok(sids) => sids,
            Err(status) => {
                check(status)?;
                return Ok(Vec::new());
            }
        };

        let present: Vec<SecurityIdentifier> = sids.iter().flatten().cloned().collect();
        let reply = if present.is_empty() {
            LookupReply::default()
        } else {
            match backend.lookup_sids(&present) {
                Ok(reply) => reply,
                Err(status) => {
                    check_lookup(status)?;
                    LookupReply::default()
                }
            }
        };

        let mut joined = join_translated_names(&reply.names, &reply.domains);
        let mut principals = Vec::with_capacity(sids.len());
        for sid in &sids {
            let Some(sid) = sid else {
                principals.push(Principal::default());
                continue;
            };
            let mut principal = Principal::from_sid(sid.to_string());
            if let Some(translated) = joined.next() {
                principal.domain = translated.domain.map(str::to_owned);
                principal.name = (!translated.name.is_empty()).then(|| translated.name.to_owned());
                principal.sid_type = translated.sid_type;
            }
            if !principal.is_resolved() || principal.sid_type.is_unresolved() {
                self.fill_unresolved(&*backend, sid, &mut principal);
            }
            principals.push(principal);
        }
        Ok(principals)
    }

    fn fill_unresolved(&self, backend: &B, sid: &SecurityIdentifier, principal: &mut Principal) {
        let lookup = match self.cache.try_get(&principal.sid) {
            Some(hit) => hit,
            None => {
                let Some(found) = backend.lookup_account_sid(sid) else {
                    return;
                };
                log::debug!("caching reverse lookup of {}", principal.sid);
                self.cache.set(principal.sid.clone(), found.clone());
                found
            }
        };
        principal.apply_lookup(lookup);
    }

    /// `domain\name` (or the SID text when unnamed) of every account holding `right`.
    ///
    /// # Errors
    /// See [`enumerate_principals`](Self::enumerate_principals).
    #[inline]
    pub fn enumerate_account_names(&self, right: UserRight) -> Result<Vec<String>, Error> {
        self.enumerate_principals(right)
            .map(|principals| principals.iter().map(Principal::account_name).collect())
    }

    /// Resolves an account name or SID text against the target system.
    ///
    /// # Errors
    /// [`Error::Disposed`], or one of the resolution errors of [`resolve`](crate::resolve).
    #[inline]
    pub fn resolve(&self, principal: &str) -> Result<SecurityIdentifier, Error> {
        let backend = self.read()?;
        identity::resolve(principal, &*backend)
    }

    /// Grants `right` to `principal` (account name or SID text).
    ///
    /// Granting a right already held succeeds.
    ///
    /// # Errors
    /// [`Error::Disposed`], a resolution error, or the translated native failure.
    pub fn grant(&self, principal: &str, right: UserRight) -> Result<(), Error> {
        let mut backend = self.write()?;
        let right_name = right.short_name();
        lsa_byte_len(right_name)?;
        let mut pinned = PinnedSid::resolve(principal, &*backend)?;
        let sid = pinned.sid().clone();
        let status = backend.add_account_right(&pinned, right_name);
        pinned.release();
        check(status)?;
        log::debug!("granted {right} to {sid}");
        Ok(())
    }

    /// Removes `right` from `principal` (account name or SID text).
    ///
    /// Revoking a right the principal does not hold succeeds.
    ///
    /// # Errors
    /// [`Error::Disposed`], a resolution error, or the translated native failure.
    pub fn revoke(&self, principal: &str, right: UserRight) -> Result<(), Error> {
        let mut backend = self.write()?;
        let right_name = right.short_name();
        lsa_byte_len(right_name)?;
        let mut pinned = PinnedSid::resolve(principal, &*backend)?;
        let sid = pinned.sid().clone();
        let status = backend.remove_account_right(&pinned, right_name);
        pinned.release();
        check_revoke(status)?;
        log::debug!("revoked {right} from {sid}");
        Ok(())
    }

    /// Releases the policy handle, waiting for in-flight operations first.
    ///
    /// Calling it again does nothing. A failure to close is logged, not returned.
    pub fn dispose(&self) {
        let mut guard = self.backend.write();
        if let Some(mut backend) = guard.take() {
            close(&mut backend);
        }
    }
}

fn close<B: PolicyBackend>(backend: &mut B) {
    match check(backend.close()) {
        Ok(()) => log::debug!("policy handle closed"),
        Err(err) => log::warn!("failed to close policy handle: {err}"),
    }
}

impl<B: PolicyBackend> Drop for PolicyClient<B> {
    fn drop(&mut self) {
        if let Some(mut backend) = self.backend.get_mut().take() {
            close(&mut backend);
        }
    }
}

impl<B: PolicyBackend> fmt::Debug for PolicyClient<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyClient")
            .field("disposed", &self.is_disposed())
            .field("cached_sids", &self.cache.len())
            .finish()
    }
}

#[cfg(windows)]
impl PolicyClient<crate::LsaPolicy> {
    /// Opens the LSA policy described by `options`.
    ///
    /// # Errors
    /// [`Error::AccessDenied`], [`Error::ResourceExhausted`], [`Error::InvalidArgument`]
    /// for an over-long machine name, or [`Error::Native`].
    #[inline]
    pub fn open(options: &ClientOptions) -> Result<Self, Error> {
        crate::LsaPolicy::open(options).map(Self::new)
    }

    /// Opens the local machine's LSA policy with [`ClientOptions::DEFAULT`].
    ///
    /// # Errors
    /// See [`PolicyClient::open`].
    #[inline]
    pub fn local() -> Result<Self, Error> {
        Self::open(&ClientOptions::DEFAULT)
    }
}
