//! Turning a principal specification into a SID a native call can point at.

use crate::{Error, SecurityIdentifier, SidIdentifierAuthority};
use core::ffi::c_void;
use core::fmt;
use delegate::delegate;
use parsing::{looks_like_sid, validate_principal};

/// Name → SID translation, the first step of identity resolution.
pub trait AccountNameLookup {
    /// Looks up `DOMAIN\name` or a bare account name.
    ///
    /// Returns `None` when the name has no mapping or the lookup failed for
    /// any other reason.
    fn lookup_account_name(&self, name: &str) -> Option<SecurityIdentifier>;
}

impl<T: AccountNameLookup + ?Sized> AccountNameLookup for &T {
    #[inline]
    fn lookup_account_name(&self, name: &str) -> Option<SecurityIdentifier> {
        (**self).lookup_account_name(name)
    }
}

/// Resolves a principal specification to a SID.
///
/// The name lookup is tried first, then `input` is parsed as SID text.
///
/// # Errors
/// - [`Error::InvalidPrincipal`] when `input` is empty, whitespace-only or has a control character.
/// - [`Error::InvalidSidFormat`] when `input` is shaped like SID text but is malformed.
/// - [`Error::UnresolvedIdentity`] otherwise.
pub fn resolve<L: AccountNameLookup + ?Sized>(
    input: &str,
    lookup: &L,
) -> Result<SecurityIdentifier, Error> {
    let input = validate_principal(input).map_err(|reason| Error::InvalidPrincipal {
        input: input.to_owned(),
        reason,
    })?;
    if let Some(sid) = lookup.lookup_account_name(input) {
        return Ok(sid);
    }
    input.parse::<SecurityIdentifier>().map_err(|_| {
        if looks_like_sid(input) {
            Error::InvalidSidFormat(input.to_owned())
        } else {
            Error::UnresolvedIdentity(input.to_owned())
        }
    })
}

/// A SID copied into a heap buffer whose address stays fixed until [`PinnedSid::release`].
///
/// The buffer holds the native in-memory layout (header followed by the
/// sub-authorities) and is word-aligned, so [`PinnedSid::as_ptr`] can be
/// handed to any API taking a `PSID`. Release is idempotent; dropping the
/// value releases it too.
pub struct PinnedSid {
    sid: SecurityIdentifier,
    buffer: Option<Box<[u32]>>,
}

impl PinnedSid {
    /// Copies `sid` into a freshly allocated buffer.
    #[must_use]
    pub fn new(sid: SecurityIdentifier) -> Self {
        let [a0, a1, a2, a3, a4, a5] = sid.identifier_authority().value;
        let mut words = Vec::with_capacity(2 + sid.sub_authorities().len());
        words.push(u32::from_ne_bytes([
            sid.revision(),
            sid.sub_authority_count(),
            a0,
            a1,
        ]));
        words.push(u32::from_ne_bytes([a2, a3, a4, a5]));
        words.extend_from_slice(sid.sub_authorities());
        Self {
            sid,
            buffer: Some(words.into_boxed_slice()),
        }
    }

    /// Resolves `input` (see [`resolve`]) and pins the result.
    ///
    /// # Errors
    /// See [`resolve`].
    #[inline]
    pub fn resolve<L: AccountNameLookup + ?Sized>(input: &str, lookup: &L) -> Result<Self, Error> {
        resolve(input, lookup).map(Self::new)
    }

    /// The structured SID.
    #[inline]
    #[must_use]
    pub const fn sid(&self) -> &SecurityIdentifier {
        &self.sid
    }

    delegate! {
        to self.sid {
            /// The identifier authority.
            pub fn identifier_authority(&self) -> SidIdentifierAuthority;
            /// The sub-authorities, in order.
            pub fn sub_authorities(&self) -> &[u32];
            /// Length in bytes of the pinned binary form.
            pub fn binary_len(&self) -> usize;
        }
    }

    /// Address of the pinned binary SID.
    ///
    /// The pointer stays valid until [`PinnedSid::release`] or drop.
    ///
    /// # Errors
    /// [`Error::Disposed`] after release.
    #[inline]
    pub fn as_ptr(&self) -> Result<*const c_void, Error> {
        self.buffer
            .as_deref()
            .map(|words| words.as_ptr().cast::<c_void>())
            .ok_or(Error::Disposed)
    }

    /// Copy of the pinned bytes, in memory order.
    ///
    /// # Errors
    /// [`Error::Disposed`] after release.
    pub fn pinned_bytes(&self) -> Result<Vec<u8>, Error> {
        let words = self.buffer.as_deref().ok_or(Error::Disposed)?;
        Ok(words.iter().flat_map(|w| w.to_ne_bytes()).collect())
    }

    /// `true` once the buffer has been freed.
    #[inline]
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.buffer.is_none()
    }

    /// Frees the buffer. Calling it again does nothing.
    #[inline]
    pub fn release(&mut self) {
        self.buffer = None;
    }
}

impl fmt::Debug for PinnedSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedSid")
            .field("sid", &self.sid)
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for PinnedSid {
    #[inline]
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use parsing::PrincipalError;
    use std::collections::HashMap;

    struct Names(HashMap<&'static str, &'static str>);

    impl AccountNameLookup for Names {
        fn lookup_account_name(&self, name: &str) -> Option<SecurityIdentifier> {
            self.0.get(name).map(|sid| sid.parse().unwrap())
        }
    }

    fn names() -> Names {
        Names(HashMap::from([
            ("BUILTIN\\Administrators", "S-1-5-32-544"),
            ("Everyone", "S-1-1-0"),
        ]))
    }

    #[test]
    fn name_lookup_wins() {
        let sid = resolve("Everyone", &names()).unwrap();
        assert_eq!(sid.to_string(), "S-1-1-0");
    }

    #[test]
    fn sid_text_is_the_fallback() {
        let sid = resolve("s-1-5-18", &names()).unwrap();
        assert_eq!(sid.to_string(), "S-1-5-18");
    }

    #[test]
    fn failure_kinds() {
        assert_eq!(
            resolve("Nobody", &names()),
            Err(Error::UnresolvedIdentity("Nobody".to_owned()))
        );
        assert_eq!(
            resolve("S-1-5-banana", &names()),
            Err(Error::InvalidSidFormat("S-1-5-banana".to_owned()))
        );
        assert_eq!(
            resolve(" ", &names()),
            Err(Error::InvalidPrincipal {
                input: " ".to_owned(),
                reason: PrincipalError::Whitespace
            })
        );
    }

    #[test]
    fn release_is_idempotent() {
        let mut pinned = PinnedSid::resolve("BUILTIN\\Administrators", &names()).unwrap();
        assert!(pinned.as_ptr().is_ok());
        pinned.release();
        pinned.release();
        assert!(pinned.is_released());
        assert_eq!(pinned.as_ptr(), Err(Error::Disposed));
        assert_eq!(pinned.pinned_bytes(), Err(Error::Disposed));
        assert_eq!(pinned.sid().to_string(), "S-1-5-32-544");
    }

    #[test]
    fn address_is_stable_and_aligned() {
        let pinned = PinnedSid::new("S-1-5-21-1-2-3-500".parse().unwrap());
        let first = pinned.as_ptr().unwrap();
        let moved = pinned;
        assert_eq!(moved.as_ptr().unwrap(), first);
        assert_eq!(first.align_offset(core::mem::align_of::<u32>()), 0);
        assert_eq!(moved.binary_len(), 28);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn pinned_layout_is_the_binary_form() {
        let sid: SecurityIdentifier = "S-1-5-32-544".parse().unwrap();
        let pinned = PinnedSid::new(sid.clone());
        assert_eq!(pinned.pinned_bytes().unwrap(), sid.to_bytes());
    }
}
