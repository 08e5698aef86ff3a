//! `NTSTATUS` values returned by the LSA policy API and their translation into [`Error`].
//!
//! Every native status is funnelled through [`check`] (or one of its
//! siblings) so the mapping lives in exactly one place.

use crate::Error;
use cfg_if::cfg_if;
use core::fmt;

/// Raw `NTSTATUS` as returned by `Lsa*` functions.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NtStatus(pub i32);

impl NtStatus {
    /// `STATUS_SUCCESS`
    pub const SUCCESS: Self = Self(0);
    /// `STATUS_SOME_NOT_MAPPED` (informational)
    pub const SOME_NOT_MAPPED: Self = Self::from_bits(0x0000_0107);
    /// `STATUS_NO_MORE_ENTRIES` (warning)
    pub const NO_MORE_ENTRIES: Self = Self::from_bits(0x8000_001A);
    /// `STATUS_INVALID_HANDLE`
    pub const INVALID_HANDLE: Self = Self::from_bits(0xC000_0008);
    /// `STATUS_INVALID_PARAMETER`
    pub const INVALID_PARAMETER: Self = Self::from_bits(0xC000_000D);
    /// `STATUS_NO_MEMORY`
    pub const NO_MEMORY: Self = Self::from_bits(0xC000_0017);
    /// `STATUS_ACCESS_DENIED`
    pub const ACCESS_DENIED: Self = Self::from_bits(0xC000_0022);
    /// `STATUS_OBJECT_NAME_NOT_FOUND`
    pub const OBJECT_NAME_NOT_FOUND: Self = Self::from_bits(0xC000_0034);
    /// `STATUS_NONE_MAPPED`
    pub const NONE_MAPPED: Self = Self::from_bits(0xC000_0073);
    /// `STATUS_INSUFFICIENT_RESOURCES`
    pub const INSUFFICIENT_RESOURCES: Self = Self::from_bits(0xC000_009A);
    /// `STATUS_NO_SUCH_PRIVILEGE`
    pub const NO_SUCH_PRIVILEGE: Self = Self::from_bits(0xC000_0060);
    /// `STATUS_RPC_NT_SERVER_UNAVAILABLE`
    pub const RPC_SERVER_UNAVAILABLE: Self = Self::from_bits(0xC002_0017);

    /// Reinterprets the documented unsigned spelling of a status.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        #[expect(
            clippy::cast_possible_wrap,
            reason = "NTSTATUS is documented as u32 hex but typed as i32"
        )]
        Self(bits as i32)
    }

    /// The unsigned spelling of the status.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        #[expect(clippy::cast_sign_loss, reason = "bit-for-bit reinterpretation")]
        let bits = self.0 as u32;
        bits
    }

    /// `NT_SUCCESS`: success and informational severities.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    /// Translates the status into a Win32 error code.
    #[must_use]
    pub fn to_win32(self) -> u32 {
        cfg_if! {
            if #[cfg(windows)] {
                // SAFETY: LsaNtStatusToWinError is a pure lookup with no pointer arguments.
                unsafe {
                    windows_sys::Win32::Security::Authentication::Identity::LsaNtStatusToWinError(self.0)
                }
            } else {
                self.to_win32_fallback()
            }
        }
    }

    /// Table used where `LsaNtStatusToWinError` is not available.
    #[cfg_attr(windows, allow(dead_code))]
    fn to_win32_fallback(self) -> u32 {
        match self {
            Self::SUCCESS | Self::SOME_NOT_MAPPED => 0,
            Self::NO_MORE_ENTRIES => 259,
            Self::INVALID_HANDLE => 6,
            Self::INVALID_PARAMETER => 87,
            Self::NO_MEMORY => 8,
            Self::ACCESS_DENIED => 5,
            Self::OBJECT_NAME_NOT_FOUND => 2,
            Self::NONE_MAPPED => 1332,
            Self::INSUFFICIENT_RESOURCES => 1450,
            Self::NO_SUCH_PRIVILEGE => 1313,
            Self::RPC_SERVER_UNAVAILABLE => 1722,
            // ERROR_MR_MID_NOT_FOUND, what RtlNtStatusToDosError yields for unmapped codes
            _ => 317,
        }
    }
}

impl fmt::Debug for NtStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NtStatus({self})")
    }
}

impl fmt::Display for NtStatus {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.bits())
    }
}

/// Central translation: success and "no more entries" pass, everything else becomes an [`Error`].
///
/// # Errors
/// [`Error::AccessDenied`], [`Error::ResourceExhausted`] or [`Error::Native`].
#[inline]
pub fn check(status: NtStatus) -> Result<(), Error> {
    match status {
        NtStatus::SUCCESS | NtStatus::NO_MORE_ENTRIES => Ok(()),
        NtStatus::ACCESS_DENIED => Err(Error::AccessDenied),
        NtStatus::INSUFFICIENT_RESOURCES | NtStatus::NO_MEMORY => Err(Error::ResourceExhausted),
        other => Err(Error::Native {
            status: other,
            code: other.to_win32(),
        }),
    }
}

/// Like [`check`], for `LsaLookupSids`: partially or fully unmapped replies still carry data.
///
/// # Errors
/// See [`check`].
#[inline]
pub fn check_lookup(status: NtStatus) -> Result<(), Error> {
    match status {
        NtStatus::SOME_NOT_MAPPED | NtStatus::NONE_MAPPED => Ok(()),
        other => check(other),
    }
}

/// Like [`check`], for `LsaRemoveAccountRights`: removing a right the account does not hold is a no-op.
///
/// # Errors
/// See [`check`].
#[inline]
pub fn check_revoke(status: NtStatus) -> Result<(), Error> {
    match status {
        NtStatus::OBJECT_NAME_NOT_FOUND => Ok(()),
        other => check(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_like_statuses_pass() {
        assert_eq!(check(NtStatus::SUCCESS), Ok(()));
        assert_eq!(check(NtStatus::NO_MORE_ENTRIES), Ok(()));
    }

    #[test]
    fn taxonomy_mapping() {
        assert_eq!(check(NtStatus::ACCESS_DENIED), Err(Error::AccessDenied));
        assert_eq!(check(NtStatus::NO_MEMORY), Err(Error::ResourceExhausted));
        assert_eq!(
            check(NtStatus::INSUFFICIENT_RESOURCES),
            Err(Error::ResourceExhausted)
        );
        assert!(matches!(
            check(NtStatus::INVALID_HANDLE),
            Err(Error::Native { status: NtStatus::INVALID_HANDLE, code: 6 })
        ));
        assert!(matches!(
            check(NtStatus::NO_SUCH_PRIVILEGE),
            Err(Error::Native { code: 1313, .. })
        ));
    }

    #[test]
    fn lookup_tolerates_unmapped() {
        assert_eq!(check_lookup(NtStatus::SOME_NOT_MAPPED), Ok(()));
        assert_eq!(check_lookup(NtStatus::NONE_MAPPED), Ok(()));
        assert_eq!(check_lookup(NtStatus::ACCESS_DENIED), Err(Error::AccessDenied));
    }

    #[test]
    fn revoke_of_absent_grant_is_success() {
        assert_eq!(check_revoke(NtStatus::OBJECT_NAME_NOT_FOUND), Ok(()));
        assert!(check(NtStatus::OBJECT_NAME_NOT_FOUND).is_err());
    }

    #[test]
    fn severity_and_display() {
        assert!(NtStatus::SOME_NOT_MAPPED.is_success());
        assert!(!NtStatus::ACCESS_DENIED.is_success());
        assert_eq!(NtStatus::ACCESS_DENIED.to_string(), "0xC0000022");
        assert_eq!(NtStatus::ACCESS_DENIED.bits(), 0xC000_0022);
    }
}
