//! The real backend over the Windows LSA policy API.

mod buffer;

use self::buffer::{LsaBuffer, LsaString};
use super::{LookupReply, PolicyBackend, TranslatedName};
use crate::decode::lsa_units_to_string;
use crate::identity::AccountNameLookup;
use crate::status::check;
use crate::{AccountLookup, ClientOptions, Error, NtStatus, PinnedSid, SecurityIdentifier, SidType};
use core::ffi::c_void;
use core::ptr::{null, null_mut};
use smallvec::SmallVec;
use widestring::U16CString;
use windows_sys::Win32::Foundation::{ERROR_INSUFFICIENT_BUFFER, GetLastError};
use windows_sys::Win32::Security::Authentication::Identity::{
    LSA_ENUMERATION_INFORMATION, LSA_HANDLE, LSA_OBJECT_ATTRIBUTES, LSA_REFERENCED_DOMAIN_LIST,
    LSA_TRANSLATED_NAME, LSA_UNICODE_STRING, LsaAddAccountRights, LsaClose,
    LsaEnumerateAccountsWithUserRight, LsaLookupSids, LsaOpenPolicy, LsaRemoveAccountRights,
};
use windows_sys::Win32::Security::{
    GetLengthSid, IsValidSid, LookupAccountNameW, LookupAccountSidW, PSID, SID_NAME_USE,
};

/// An open `LSA_HANDLE` on the local or a remote machine.
#[derive(Debug)]
pub struct LsaPolicy {
    handle: LSA_HANDLE,
    system_name: Option<U16CString>,
}

// SAFETY: LSA policy handles are not tied to the opening thread, and
// `PolicyClient` serializes every mutating call behind its write lock.
unsafe impl Send for LsaPolicy {}
// SAFETY: shared access only issues read-only LSA calls, which the LSA
// allows concurrently on one handle.
unsafe impl Sync for LsaPolicy {}

impl LsaPolicy {
    /// Opens the policy of `options.target()` (local machine when `None`).
    ///
    /// `STATUS_NO_MORE_ENTRIES` from the open call is accepted.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] for an over-long machine name, otherwise the
    /// translated status.
    pub fn open(options: &ClientOptions) -> Result<Self, Error> {
        let system = options.target().map(LsaString::new).transpose()?;
        let system_raw = system.as_ref().map(LsaString::as_raw);

        // SAFETY: LSA_OBJECT_ATTRIBUTES is plain data; all-zero is the documented initial state.
        let mut attributes: LSA_OBJECT_ATTRIBUTES = unsafe { core::mem::zeroed() };
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the structure is a few dozen bytes"
        )]
        let length = size_of::<LSA_OBJECT_ATTRIBUTES>() as u32;
        attributes.Length = length;

        let mut handle: LSA_HANDLE = null_mut();
        // SAFETY: every pointer is valid for the duration of the call; `system` owns the name buffer.
        let status = NtStatus(unsafe {
            LsaOpenPolicy(
                system_raw
                    .as_ref()
                    .map_or(null(), |raw| core::ptr::from_ref::<LSA_UNICODE_STRING>(raw)),
                &raw const attributes,
                options.desired_access,
                &raw mut handle,
            )
        });
        check(status)?;
        log::debug!(
            "opened LSA policy on {}",
            options.target().unwrap_or("the local machine")
        );
        Ok(Self {
            handle,
            system_name: options.target().map(U16CString::from_str_truncate),
        })
    }

    fn system_name_ptr(&self) -> *const u16 {
        self.system_name.as_ref().map_or(null(), |name| name.as_ptr())
    }
}

/// Copies the SID at `psid`.
///
/// # Safety
/// `psid` must be null or point to readable memory holding a SID.
unsafe fn sid_from_raw(psid: PSID) -> Option<SecurityIdentifier> {
    if psid.is_null() {
        return None;
    }
    // SAFETY: non-null and readable per the caller's contract.
    if unsafe { IsValidSid(psid) } == 0 {
        return None;
    }
    // SAFETY: IsValidSid accepted the structure.
    let len = usize::try_from(unsafe { GetLengthSid(psid) }).ok()?;
    // SAFETY: a valid SID spans exactly GetLengthSid bytes.
    let bytes = unsafe { core::slice::from_raw_parts(psid.cast::<u8>().cast_const(), len) };
    SecurityIdentifier::from_bytes(bytes).ok()
}

/// Reads an `LSA_UNICODE_STRING` returned by the LSA.
///
/// # Safety
/// `Buffer` must be null or valid for `Length` bytes.
unsafe fn lsa_string(value: &LSA_UNICODE_STRING) -> String {
    if value.Buffer.is_null() {
        return String::new();
    }
    let units = usize::from(value.Length >> 1);
    // SAFETY: the LSA guarantees `Length` readable bytes behind `Buffer`.
    let buffer = unsafe { core::slice::from_raw_parts(value.Buffer.cast_const(), units) };
    lsa_units_to_string(buffer, value.Length)
}

impl AccountNameLookup for LsaPolicy {
    fn lookup_account_name(&self, name: &str) -> Option<SecurityIdentifier> {
        let account = U16CString::from_str(name).ok()?;
        let mut sid_len = 0u32;
        let mut domain_len = 0u32;
        let mut sid_type: SID_NAME_USE = 0;

        // SAFETY: size probe with null output buffers and zero lengths.
        let probe = unsafe {
            LookupAccountNameW(
                self.system_name_ptr(),
                account.as_ptr(),
                null_mut(),
                &raw mut sid_len,
                null_mut(),
                &raw mut domain_len,
                &raw mut sid_type,
            )
        };
        // SAFETY: GetLastError is always safe to call.
        if probe != 0 || unsafe { GetLastError() } != ERROR_INSUFFICIENT_BUFFER {
            return None;
        }

        // u32 words keep the SID buffer aligned
        let words = usize::try_from(sid_len).ok()?.div_ceil(4);
        let mut sid_buffer = SmallVec::<[u32; 17]>::from_elem(0, words);
        let mut domain_buffer =
            SmallVec::<[u16; 256]>::from_elem(0, usize::try_from(domain_len).ok()?);
        // SAFETY: both buffers hold at least the sizes reported by the probe.
        let ok = unsafe {
            LookupAccountNameW(
                self.system_name_ptr(),
                account.as_ptr(),
                sid_buffer.as_mut_ptr().cast::<c_void>(),
                &raw mut sid_len,
                domain_buffer.as_mut_ptr(),
                &raw mut domain_len,
                &raw mut sid_type,
            )
        };
        if ok == 0 {
            return None;
        }
        // SAFETY: LookupAccountNameW succeeded and wrote a SID into `sid_buffer`.
        unsafe { sid_from_raw(sid_buffer.as_mut_ptr().cast::<c_void>()) }
    }
}

impl PolicyBackend for LsaPolicy {
    fn accounts_with_right(&self, right: &str) -> Result<Vec<Option<SecurityIdentifier>>, NtStatus> {
        let right = LsaString::new(right).map_err(|_| NtStatus::INVALID_PARAMETER)?;
        let right_raw = right.as_raw();
        let mut buffer = LsaBuffer::<LSA_ENUMERATION_INFORMATION>::null();
        let mut count = 0u32;
        // SAFETY: `right_raw` borrows `right`, `buffer` frees whatever the LSA allocates.
        let status = NtStatus(unsafe {
            LsaEnumerateAccountsWithUserRight(
                self.handle,
                &raw const right_raw,
                buffer.as_out().cast::<*mut c_void>(),
                &raw mut count,
            )
        });
        if status != NtStatus::SUCCESS {
            return Err(status);
        }
        let count = usize::try_from(count).map_err(|_| NtStatus::INVALID_PARAMETER)?;
        // SAFETY: on success the buffer holds `count` entries.
        let entries = unsafe { buffer.as_slice(count) };
        Ok(entries
            .iter()
            // SAFETY: each entry's SID lives inside `buffer`.
            .map(|entry| unsafe { sid_from_raw(entry.Sid) })
            .collect())
    }

    fn lookup_sids(&self, sids: &[SecurityIdentifier]) -> Result<LookupReply, NtStatus> {
        let pinned: Vec<PinnedSid> = sids.iter().cloned().map(PinnedSid::new).collect();
        let pointers: Vec<PSID> = pinned
            .iter()
            .filter_map(|sid| sid.as_ptr().ok())
            .map(<*const c_void>::cast_mut)
            .collect();
        let count = u32::try_from(pointers.len()).map_err(|_| NtStatus::INVALID_PARAMETER)?;

        let mut domains = LsaBuffer::<LSA_REFERENCED_DOMAIN_LIST>::null();
        let mut names = LsaBuffer::<LSA_TRANSLATED_NAME>::null();
        // SAFETY: `pointers` addresses live in `pinned`, which outlives the call.
        let status = NtStatus(unsafe {
            LsaLookupSids(
                self.handle,
                count,
                pointers.as_ptr(),
                domains.as_out(),
                names.as_out(),
            )
        });
        if !status.is_success() {
            return Err(status);
        }

        // SAFETY: one translated name per input SID.
        let translated = unsafe { names.as_slice(pointers.len()) };
        let names = translated
            .iter()
            .map(|entry| TranslatedName {
                sid_type: SidType::from(entry.Use),
                // SAFETY: the name buffer belongs to `names`.
                name: unsafe { lsa_string(&entry.Name) },
                domain_index: entry.DomainIndex,
            })
            .collect();

        // SAFETY: the list, when present, was allocated by LsaLookupSids.
        let domains = match unsafe { domains.as_ref() } {
            Some(list) => {
                let entries = usize::try_from(list.Entries).unwrap_or(0);
                // SAFETY: `Domains` points to `Entries` trust records owned by `domains`.
                let trust = unsafe { buffer::slice_or_empty(list.Domains, entries) };
                trust
                    .iter()
                    // SAFETY: each domain name lives inside the list allocation.
                    .map(|info| unsafe { lsa_string(&info.Name) })
                    .collect()
            }
            None => Vec::new(),
        };
        Ok(LookupReply { names, domains })
    }

    fn lookup_account_sid(&self, sid: &SecurityIdentifier) -> Option<AccountLookup> {
        let pinned = PinnedSid::new(sid.clone());
        let psid = pinned.as_ptr().ok()?.cast_mut();
        let mut name_len = 0u32;
        let mut domain_len = 0u32;
        let mut sid_type: SID_NAME_USE = 0;

        // SAFETY: size probe with null output buffers and zero lengths.
        let probe = unsafe {
            LookupAccountSidW(
                self.system_name_ptr(),
                psid,
                null_mut(),
                &raw mut name_len,
                null_mut(),
                &raw mut domain_len,
                &raw mut sid_type,
            )
        };
        // SAFETY: GetLastError is always safe to call.
        if probe != 0 || unsafe { GetLastError() } != ERROR_INSUFFICIENT_BUFFER {
            return None;
        }

        let mut name = SmallVec::<[u16; 256]>::from_elem(0, usize::try_from(name_len).ok()?);
        let mut domain = SmallVec::<[u16; 256]>::from_elem(0, usize::try_from(domain_len).ok()?);
        // SAFETY: both buffers hold the sizes reported by the probe.
        let ok = unsafe {
            LookupAccountSidW(
                self.system_name_ptr(),
                psid,
                name.as_mut_ptr(),
                &raw mut name_len,
                domain.as_mut_ptr(),
                &raw mut domain_len,
                &raw mut sid_type,
            )
        };
        if ok == 0 {
            return None;
        }
        // on success the lengths exclude the terminator
        name.truncate(usize::try_from(name_len).ok()?);
        domain.truncate(usize::try_from(domain_len).ok()?);
        Some(AccountLookup::new(
            String::from_utf16_lossy(&domain),
            String::from_utf16_lossy(&name),
            SidType::from(sid_type),
        ))
    }

    fn add_account_right(&mut self, sid: &PinnedSid, right: &str) -> NtStatus {
        let (Ok(right), Ok(psid)) = (LsaString::new(right), sid.as_ptr()) else {
            return NtStatus::INVALID_PARAMETER;
        };
        let right_raw = right.as_raw();
        // SAFETY: `psid` stays pinned by `sid`, `right_raw` borrows `right`.
        NtStatus(unsafe { LsaAddAccountRights(self.handle, psid.cast_mut(), &raw const right_raw, 1) })
    }

    fn remove_account_right(&mut self, sid: &PinnedSid, right: &str) -> NtStatus {
        let (Ok(right), Ok(psid)) = (LsaString::new(right), sid.as_ptr()) else {
            return NtStatus::INVALID_PARAMETER;
        };
        let right_raw = right.as_raw();
        // SAFETY: `psid` stays pinned by `sid`, `right_raw` borrows `right`.
        NtStatus(unsafe {
            LsaRemoveAccountRights(
                self.handle,
                psid.cast_mut(),
                Default::default(),
                &raw const right_raw,
                1,
            )
        })
    }

    fn close(&mut self) -> NtStatus {
        let handle = core::mem::replace(&mut self.handle, null_mut());
        if handle.is_null() {
            return NtStatus::SUCCESS;
        }
        // SAFETY: `handle` came from LsaOpenPolicy and is closed exactly once.
        NtStatus(unsafe { LsaClose(handle) })
    }
}

impl Drop for LsaPolicy {
    fn drop(&mut self) {
        if let Err(err) = check(self.close()) {
            log::warn!("failed to close LSA handle: {err}");
        }
    }
}
