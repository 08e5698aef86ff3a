/// The 6-byte, big-endian identifier authority of a SID.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SidIdentifierAuthority {
    /// Raw authority bytes, most significant first.
    pub value: [u8; 6],
}

impl SidIdentifierAuthority {
    /// `S-1-0`
    pub const NULL_AUTHORITY: Self = Self::from_u8(0);
    /// `S-1-1` (Everyone)
    pub const SECURITY_WORLD_AUTHORITY: Self = Self::from_u8(1);
    /// `S-1-2`
    pub const SECURITY_LOCAL_AUTHORITY: Self = Self::from_u8(2);
    /// `S-1-3`
    pub const SECURITY_CREATOR_AUTHORITY: Self = Self::from_u8(3);
    /// `S-1-5`
    pub const NT_AUTHORITY: Self = Self::from_u8(5);

    const fn from_u8(last: u8) -> Self {
        Self {
            value: [0, 0, 0, 0, 0, last],
        }
    }

    /// The authority as an integer (at most 48 significant bits).
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        let [a, b, c, d, e, f] = self.value;
        u64::from_be_bytes([0, 0, a, b, c, d, e, f])
    }
}

impl From<[u8; 6]> for SidIdentifierAuthority {
    #[inline]
    fn from(value: [u8; 6]) -> Self {
        Self { value }
    }
}

impl From<SidIdentifierAuthority> for [u8; 6] {
    #[inline]
    fn from(value: SidIdentifierAuthority) -> Self {
        value.value
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use proptest::prelude::*;
    prop_compose! {
        pub fn arb_identifier_authority()
            (bytes in any::<[u8; 6]>())
            -> SidIdentifierAuthority {
            SidIdentifierAuthority::from(bytes)
        }
    }

    #[test]
    fn well_known_values() {
        assert_eq!(SidIdentifierAuthority::NT_AUTHORITY.as_u64(), 5);
        assert_eq!(SidIdentifierAuthority::default(), SidIdentifierAuthority::NULL_AUTHORITY);
        assert_eq!(
            SidIdentifierAuthority::from([0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC]).as_u64(),
            0x1234_5678_9ABC
        );
    }
}
