use crate::SidIdentifierAuthority;
use arrayvec::ArrayVec;
use core::fmt::{self, Debug, Display};
use core::str::FromStr;
pub use parsing::InvalidSidFormat;
use parsing::{MAX_SUBAUTHORITY_COUNT, SID_REVISION, SidComponents};

/// Size of the fixed SID header: revision, count and identifier authority.
pub(crate) const SID_HEAD_SIZE: usize = 8;

/// Owned Windows **Security Identifier** (SID).
///
/// Holds the identifier authority and up to 15 sub-authorities. The revision
/// is always `1`. Equality, hashing and ordering all work on the decoded
/// parts, so two SIDs parsed from differently cased text (`s-1-5-18` and
/// `S-1-5-18`) compare equal.
///
/// # Examples
/// ```rust
/// # use win_user_rights::{SecurityIdentifier, SidIdentifierAuthority};
/// let sid = SecurityIdentifier::try_new(
///     SidIdentifierAuthority::NT_AUTHORITY,
///     [32u32, 544u32],
/// ).expect("valid SID parts");
/// assert_eq!(sid.to_string(), "S-1-5-32-544");
/// assert_eq!(sid.binary_len(), 16);
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecurityIdentifier {
    identifier_authority: SidIdentifierAuthority,
    sub_authority: ArrayVec<u32, { MAX_SUBAUTHORITY_COUNT as usize }>,
}

impl Debug for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", stringify!(SecurityIdentifier))
    }
}

impl SecurityIdentifier {
    /// SID revision, always `1`.
    pub const REVISION: u8 = SID_REVISION;

    /// Creates a SID from parts.
    ///
    /// Returns `None` if more than 15 sub-authorities are given.
    #[must_use]
    #[inline]
    pub fn try_new<I: Into<SidIdentifierAuthority>, S: AsRef<[u32]>>(
        identifier_authority: I,
        sub_authority: S,
    ) -> Option<Self> {
        let sub_authority = ArrayVec::try_from(sub_authority.as_ref()).ok()?;
        Some(Self {
            identifier_authority: identifier_authority.into(),
            sub_authority,
        })
    }

    /// Decodes the self-relative binary form (`8 + 4·n` bytes, sub-authorities little-endian).
    ///
    /// # Errors
    /// [`InvalidSidFormat`] if the revision, sub-authority count or length is wrong.
    ///
    /// # Examples
    /// ```rust
    /// # use win_user_rights::SecurityIdentifier;
    /// let bytes: [u8; 16] = [1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0];
    /// let sid = SecurityIdentifier::from_bytes(&bytes).unwrap();
    /// assert_eq!(sid.to_string(), "S-1-5-32-544");
    /// ```
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidSidFormat> {
        let (head, tail) = bytes
            .split_first_chunk::<SID_HEAD_SIZE>()
            .ok_or(InvalidSidFormat)?;
        let [revision, count, a, b, c, d, e, f] = *head;
        if revision != Self::REVISION || count > MAX_SUBAUTHORITY_COUNT {
            return Err(InvalidSidFormat);
        }
        if tail.len() != usize::from(count) * 4 {
            return Err(InvalidSidFormat);
        }
        let sub_authority = tail
            .chunks_exact(4)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word.copy_from_slice(chunk);
                u32::from_le_bytes(word)
            })
            .collect();
        Ok(Self {
            identifier_authority: SidIdentifierAuthority::from([a, b, c, d, e, f]),
            sub_authority,
        })
    }

    /// Encodes the self-relative binary form.
    #[inline]
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.binary_len());
        out.push(Self::REVISION);
        out.push(self.sub_authority_count());
        out.extend_from_slice(&self.identifier_authority.value);
        for sub in &self.sub_authority {
            out.extend_from_slice(&sub.to_le_bytes());
        }
        out
    }

    /// Length in bytes of the binary form.
    #[inline]
    #[must_use]
    pub fn binary_len(&self) -> usize {
        SID_HEAD_SIZE + self.sub_authority.len() * 4
    }

    /// SID revision, always [`Self::REVISION`].
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u8 {
        Self::REVISION
    }

    /// The identifier authority.
    #[inline]
    #[must_use]
    pub const fn identifier_authority(&self) -> SidIdentifierAuthority {
        self.identifier_authority
    }

    /// The sub-authorities, in order.
    #[inline]
    #[must_use]
    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authority
    }

    /// Number of sub-authorities (0..=15).
    #[inline]
    #[must_use]
    pub fn sub_authority_count(&self) -> u8 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "ArrayVec capacity is MAX_SUBAUTHORITY_COUNT"
        )]
        let count = self.sub_authority.len() as u8;
        count
    }
}

impl TryFrom<&[u8]> for SecurityIdentifier {
    type Error = InvalidSidFormat;

    #[inline]
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(value)
    }
}

impl From<SidComponents> for SecurityIdentifier {
    #[inline]
    fn from(value: SidComponents) -> Self {
        Self {
            identifier_authority: value.identifier_authority.into(),
            sub_authority: value.sub_authority,
        }
    }
}

impl FromStr for SecurityIdentifier {
    type Err = InvalidSidFormat;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SidComponents::from_str(s).map(Self::from)
    }
}

impl Display for SecurityIdentifier {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", Self::REVISION)?;

        // Identifier Authority: decimal if it fits in u32, else hex
        let id_auth_value = self.identifier_authority.as_u64();
        if id_auth_value <= 0xFFFF_FFFF {
            write!(f, "-{id_auth_value}")?;
        } else {
            write!(f, "-0x{id_auth_value:012X}")?;
        }

        for &sub_auth in &self.sub_authority {
            write!(f, "-{sub_auth}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
#[allow(clippy::expect_used, reason = "Expect is not an issue in test")]
pub mod test {
    use super::SecurityIdentifier;
    use crate::sid_identifier_authority::test::arb_identifier_authority;
    use crate::SidIdentifierAuthority;
    use proptest::prelude::*;

    pub fn arb_security_identifier() -> impl Strategy<Value = SecurityIdentifier> {
        (
            arb_identifier_authority(),
            proptest::collection::vec(any::<u32>(), 0..=15),
        )
            .prop_map(|(identifier_authority, sub_authorities)| {
                SecurityIdentifier::try_new(identifier_authority, sub_authorities)
                    .expect("Failed to generate SecurityIdentifier")
            })
    }

    proptest! {
        #[test]
        fn text_form_parses_back(sid in arb_security_identifier()) {
            let text = sid.to_string();
            prop_assert!(text.starts_with("S-1-"), "Display doesn't start with S-1- : {}", text);
            let parsed: SecurityIdentifier = text.parse().unwrap();
            prop_assert_eq!(parsed, sid);
        }

        #[test]
        fn binary_form_has_declared_length(sid in arb_security_identifier()) {
            let bytes = sid.to_bytes();
            prop_assert_eq!(bytes.len(), sid.binary_len());
            prop_assert_eq!(SecurityIdentifier::from_bytes(&bytes).unwrap(), sid);
        }
    }

    #[test]
    fn binary_layout_matches_windows() {
        let sid: SecurityIdentifier = "S-1-5-32-544".parse().unwrap();
        assert_eq!(
            sid.to_bytes(),
            [1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0]
        );
    }

    #[test]
    fn rejects_inconsistent_binary() {
        // count says 2, only one sub-authority present
        assert!(SecurityIdentifier::from_bytes(&[1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0]).is_err());
        // wrong revision
        assert!(SecurityIdentifier::from_bytes(&[2, 1, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0]).is_err());
        assert!(SecurityIdentifier::from_bytes(&[1, 0, 0]).is_err());
    }

    #[test]
    fn large_authority_is_rendered_in_hex() {
        let sid =
            SecurityIdentifier::try_new([0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC], [1u32]).unwrap();
        assert_eq!(sid.to_string(), "S-1-0x123456789ABC-1");
    }

    #[test]
    fn too_many_sub_authorities() {
        assert!(SecurityIdentifier::try_new(SidIdentifierAuthority::NT_AUTHORITY, [0u32; 16]).is_none());
    }

    #[test]
    fn debug_shows_text_form() {
        let sid: SecurityIdentifier = "s-1-1-0".parse().unwrap();
        assert_eq!(format!("{sid:?}"), "SecurityIdentifier(S-1-1-0)");
    }
}
