//! # Windows User Rights Assignment for Rust
//!
//! Read and reconcile which accounts hold a user right (privileges such as
//! `SeDebugPrivilege` and logon rights such as `SeServiceLogonRight`) in a
//! machine's LSA policy.
//!
//! The crate provides:
//! - [`PolicyClient`]: a thread-safe owner of one policy handle that
//!   enumerates holders, grants and revokes rights, and resolves account
//!   names or SID text to a [`SecurityIdentifier`].
//! - [`reconcile`](reconcile::reconcile) and [`UserRights::set`]: make the
//!   holders of a right exactly a desired list, reporting a [`SetResult`].
//! - [`SidCache`]: a bounded LRU of reverse lookups shared by clients.
//! - [`UserRight`] and [`RightDefinition`]: the catalog of well-known rights.
//! - [`PolicyBackend`]: the seam every native call goes through. `LsaPolicy`
//!   talks to the real LSA on Windows; [`MemoryPolicy`] is an in-process store
//!   available on every platform.
//!
//! ## Examples
//! ### Reconcile against an in-memory policy
//! ```rust
//! use win_user_rights::{MemoryPolicy, PolicyClient, SidType, UserRight, UserRights};
//!
//! let store = MemoryPolicy::new()
//!     .with_account("BUILTIN", "Administrators", "S-1-5-32-544".parse().unwrap(), SidType::Alias)
//!     .with_grant(UserRight::SeBackupPrivilege, "S-1-1-0".parse().unwrap());
//! let rights = UserRights::with_client(PolicyClient::new(store.clone()));
//!
//! let result = rights
//!     .set(UserRight::SeBackupPrivilege, &["BUILTIN\\Administrators"])
//!     .unwrap();
//! assert_eq!(result.added, ["S-1-5-32-544"]);
//! assert_eq!(result.removed, ["S-1-1-0"]);
//! assert_eq!(store.holders(UserRight::SeBackupPrivilege), ["S-1-5-32-544"]);
//! rights.dispose();
//! ```
//!
//! ### (Windows) Inspect the local policy
//! ```no_run
//! # #[cfg(windows)]
//! # {
//! use win_user_rights::{UserRight, UserRights};
//! let rights = UserRights::open(None).unwrap();
//! for principal in rights.principals(UserRight::SeServiceLogonRight).unwrap() {
//!     log::info!("{principal}");
//! }
//! rights.dispose();
//! # }
//! ```
//!
//! ## Logging
//! Diagnostics go through the [`log`] facade; no logger is installed.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

mod backend;
mod cache;
mod catalog;
mod client;
pub mod decode;
mod error;
mod ext;
mod identity;
mod principal;
pub mod reconcile;
mod security_identifier;
#[cfg(feature = "serde")]
mod serde_impl;
mod sid_identifier_authority;
mod sid_type;
mod status;
mod user_rights;

#[cfg(windows)]
pub use backend::LsaPolicy;
pub use backend::{LookupReply, MemoryPolicy, Operation, PolicyBackend, TranslatedName};
pub use cache::SidCache;
pub use catalog::{RightDefinition, UnknownRight, UserRight};
pub use client::{ClientOptions, POLICY_ALL_ACCESS, PolicyClient};
pub use error::Error;
#[cfg_attr(docsrs, doc(cfg(windows)))]
#[cfg(windows)]
pub use ext::UserRightExt;
pub use identity::{AccountNameLookup, PinnedSid, resolve};
pub use parsing::{LsaStringError, PrincipalError};
pub use principal::{AccountLookup, Principal, RightState};
pub use reconcile::SetResult;
pub use security_identifier::{InvalidSidFormat, SecurityIdentifier};
pub use sid_type::SidType;
pub use status::NtStatus;
pub use user_rights::UserRights;

/// Identifier authority component of a SID (6-byte value).
pub use sid_identifier_authority::SidIdentifierAuthority;
