use core::ptr::null_mut;
use parsing::{LsaStringError, lsa_byte_len};
use widestring::U16String;
use windows_sys::Win32::Security::Authentication::Identity::{LSA_UNICODE_STRING, LsaFreeMemory};

/// Memory allocated by the LSA, freed with `LsaFreeMemory` on drop.
pub(super) struct LsaBuffer<T>(*mut T);

impl<T> LsaBuffer<T> {
    pub(super) const fn null() -> Self {
        Self(null_mut())
    }

    /// Out-parameter for the LSA call that allocates the buffer.
    pub(super) fn as_out(&mut self) -> *mut *mut T {
        &raw mut self.0
    }

    /// # Safety
    /// The buffer must be null or hold a valid `T`.
    pub(super) unsafe fn as_ref(&self) -> Option<&T> {
        // SAFETY: forwarded to the caller.
        unsafe { self.0.as_ref() }
    }

    /// # Safety
    /// The buffer must be null or hold at least `len` contiguous `T`.
    pub(super) unsafe fn as_slice(&self, len: usize) -> &[T] {
        // SAFETY: forwarded to the caller.
        unsafe { slice_or_empty(self.0, len) }
    }
}

impl<T> Drop for LsaBuffer<T> {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // SAFETY: the pointer was allocated by the LSA and is freed once.
            unsafe { LsaFreeMemory(self.0.cast_const().cast()) };
        }
    }
}

/// # Safety
/// `ptr` must be null or valid for `len` reads of `T`.
pub(super) unsafe fn slice_or_empty<'a, T>(ptr: *mut T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        // SAFETY: non-null and valid for `len` elements per the caller's contract.
        unsafe { core::slice::from_raw_parts(ptr.cast_const(), len) }
    }
}

/// Owned UTF-16 text passed to the LSA as an `LSA_UNICODE_STRING`.
pub(super) struct LsaString {
    units: U16String,
    length: u16,
}

impl LsaString {
    pub(super) fn new(s: &str) -> Result<Self, LsaStringError> {
        let length = lsa_byte_len(s)?;
        Ok(Self {
            units: U16String::from_str(s),
            length,
        })
    }

    /// Borrowing view; valid while `self` lives.
    pub(super) fn as_raw(&self) -> LSA_UNICODE_STRING {
        LSA_UNICODE_STRING {
            Length: self.length,
            MaximumLength: self.length,
            Buffer: self.units.as_ptr().cast_mut(),
        }
    }
}
