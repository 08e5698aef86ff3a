use crate::status::NtStatus;
use parsing::{LsaStringError, PrincipalError};
use thiserror::Error;

/// Errors returned by the policy client, the identity resolver and reconciliation.
///
/// Every public operation either succeeds or fails with exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller lacks the rights needed to open or use the policy.
    #[error("access denied by the local security authority")]
    AccessDenied,

    /// The system reported `STATUS_NO_MEMORY` or `STATUS_INSUFFICIENT_RESOURCES`.
    #[error("the local security authority ran out of resources")]
    ResourceExhausted,

    /// Any other failing status, with its translated Win32 error code.
    #[error("LSA call failed with status {status} (Win32 error {code})")]
    Native {
        /// Raw status returned by the native call.
        status: NtStatus,
        /// Win32 translation of `status`.
        code: u32,
    },

    /// The operation was attempted after the policy handle was released.
    #[error("the policy handle has been disposed")]
    Disposed,

    /// The input is neither a known account name nor a SID string.
    #[error("principal {0:?} could not be resolved to a SID")]
    UnresolvedIdentity(String),

    /// The input looks like SID text but is structurally malformed.
    #[error("{0:?} is not a valid SID string")]
    InvalidSidFormat(String),

    /// The principal specification is empty, whitespace-only or contains control characters.
    #[error("invalid principal {input:?}: {reason}")]
    InvalidPrincipal {
        /// Rejected specification.
        input: String,
        /// What is wrong with it.
        reason: PrincipalError,
    },

    /// A string argument cannot be carried to the native API.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] LsaStringError),
}

impl Error {
    /// Closest Win32 error code, used for `HRESULT` interop.
    #[must_use]
    pub const fn win32_code(&self) -> u32 {
        match self {
            Self::AccessDenied => 5,               // ERROR_ACCESS_DENIED
            Self::ResourceExhausted => 8,          // ERROR_NOT_ENOUGH_MEMORY
            Self::Native { code, .. } => *code,
            Self::Disposed => 6,                   // ERROR_INVALID_HANDLE
            Self::UnresolvedIdentity(_) => 1332,   // ERROR_NONE_MAPPED
            Self::InvalidSidFormat(_) => 1337,     // ERROR_INVALID_SID
            Self::InvalidPrincipal { .. } | Self::InvalidArgument(_) => 87, // ERROR_INVALID_PARAMETER
        }
    }
}

#[cfg(all(windows, feature = "windows_result"))]
impl From<Error> for windows_result::HRESULT {
    #[inline]
    fn from(value: Error) -> Self {
        Self::from_win32(value.win32_code())
    }
}

#[cfg(all(windows, feature = "windows_result"))]
impl From<Error> for windows_result::Error {
    #[inline]
    fn from(value: Error) -> Self {
        let hresult: windows_result::HRESULT = value.into();
        Self::from_hresult(hresult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_input() {
        let err = Error::UnresolvedIdentity("Nobody$".to_owned());
        assert_eq!(
            err.to_string(),
            "principal \"Nobody$\" could not be resolved to a SID"
        );
        let err = Error::InvalidPrincipal {
            input: String::new(),
            reason: PrincipalError::Empty,
        };
        assert_eq!(err.to_string(), "invalid principal \"\": principal is empty");
    }

    #[test]
    fn win32_codes() {
        assert_eq!(Error::AccessDenied.win32_code(), 5);
        assert_eq!(Error::Disposed.win32_code(), 6);
        assert_eq!(
            Error::Native {
                status: NtStatus::NO_SUCH_PRIVILEGE,
                code: 1313
            }
            .win32_code(),
            1313
        );
        assert_eq!(Error::from(LsaStringError::Empty).win32_code(), 87);
    }
}
