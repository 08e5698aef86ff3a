use num_enum::{FromPrimitive, IntoPrimitive};

/// Classification of an account SID, mirroring `SID_NAME_USE`.
///
/// Raw values outside the known range convert to [`SidType::Unknown`].
/// # see also
/// See Microsoft docs for [SID_NAME_USE](https://learn.microsoft.com/en-us/windows/win32/api/winnt/ne-winnt-sid_name_use).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum SidType {
    /// A SID for a user account.
    User = 1,

    /// A SID for a group account.
    Group = 2,

    /// A SID that identifies a domain.
    Domain = 3,

    /// A SID for an alias (local group).
    Alias = 4,

    /// A well-known group SID (e.g., Everyone, LocalSystem).
    KnownGroup = 5,

    /// A SID for an account that has been deleted.
    DeletedAccount = 6,

    /// An invalid SID (not a valid account/domain SID).
    Invalid = 7,

    /// A SID of unknown type (could not be determined).
    #[num_enum(default)]
    Unknown = 8,

    /// A SID that identifies a computer (machine account).
    Computer = 9,
}

impl Default for SidType {
    #[inline]
    fn default() -> Self {
        Self::Unknown
    }
}

impl SidType {
    /// `true` for the two classifications that mean the lookup did not really succeed.
    #[inline]
    #[must_use]
    pub const fn is_unresolved(self) -> bool {
        matches!(self, Self::Unknown | Self::Invalid)
    }
}
