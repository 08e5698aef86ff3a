//! Pure decoding helpers for LSA reply buffers.
//!
//! Native buffers are read into slices by the Windows backend; everything
//! here works on plain Rust data so it is testable on every platform.

use crate::SidType;
use crate::backend::TranslatedName;

/// A translated name joined to its referenced domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedName<'a> {
    /// Domain, `None` when the index is out of range or the domain name is empty.
    pub domain: Option<&'a str>,
    /// Account name, possibly empty.
    pub name: &'a str,
    /// Classification reported by the lookup.
    pub sid_type: SidType,
}

impl JoinedName<'_> {
    /// `domain\name`, or the bare name when there is no domain.
    #[must_use]
    pub fn qualified(&self) -> String {
        match self.domain {
            Some(domain) => format!("{domain}\\{}", self.name),
            None => self.name.to_owned(),
        }
    }
}

/// Joins each translated name with `domains[domain_index]`.
///
/// Negative or out-of-range indices and empty domain names yield no domain.
///
/// # Examples
/// ```rust
/// # use win_user_rights::{SidType, TranslatedName, decode::join_translated_names};
/// let names = [
///     TranslatedName { sid_type: SidType::Alias, name: "Administrators".into(), domain_index: 0 },
///     TranslatedName { sid_type: SidType::User, name: "ghost".into(), domain_index: 7 },
/// ];
/// let domains = ["BUILTIN".to_owned()];
/// let joined: Vec<_> = join_translated_names(&names, &domains).map(|j| j.qualified()).collect();
/// assert_eq!(joined, ["BUILTIN\\Administrators", "ghost"]);
/// ```
pub fn join_translated_names<'a>(
    names: &'a [TranslatedName],
    domains: &'a [String],
) -> impl Iterator<Item = JoinedName<'a>> + 'a {
    names.iter().map(move |entry| JoinedName {
        domain: usize::try_from(entry.domain_index)
            .ok()
            .and_then(|index| domains.get(index))
            .map(String::as_str)
            .filter(|domain| !domain.is_empty()),
        name: &entry.name,
        sid_type: entry.sid_type,
    })
}

/// Converts the payload of an `LSA_UNICODE_STRING`.
///
/// `length` is the byte length reported by the structure; only that many
/// bytes are read, and the buffer need not be NUL-terminated. Invalid UTF-16
/// is replaced rather than rejected.
#[must_use]
pub fn lsa_units_to_string(buffer: &[u16], length: u16) -> String {
    #[expect(
        clippy::integer_division,
        reason = "LSA lengths are byte counts of whole UTF-16 units"
    )]
    let units = usize::from(length) / 2;
    String::from_utf16_lossy(buffer.get(..units).unwrap_or(buffer))
}
