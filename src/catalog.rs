//! Catalog of the well-known user rights and their human-readable metadata.
//!
//! The table is static data: every [`UserRight`] has exactly one
//! [`RightDefinition`], and the short name doubles as the LSA right string
//! passed to the native API.

use core::fmt;
use core::str::FromStr;
use thiserror::Error;

/// Static metadata describing one user right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RightDefinition {
    /// The right this entry describes.
    pub right: UserRight,
    /// Constant name used by the LSA (e.g. `SeDebugPrivilege`).
    pub short_name: &'static str,
    /// Group Policy display name.
    pub display_name: &'static str,
    /// What holding the right allows.
    pub description: &'static str,
}

macro_rules! user_rights {
    ($( $(#[$meta:meta])* $variant:ident => $display:literal, $description:literal; )+) => {
        /// Well-known user rights (privileges and logon rights).
        #[allow(clippy::enum_variant_names, reason = "variants mirror the LSA constant names")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum UserRight {
            $( $(#[$meta])* $variant, )+
        }

        impl UserRight {
            /// Every right, in catalog order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Constant name used by the LSA (e.g. `SeServiceLogonRight`).
            #[inline]
            #[must_use]
            pub const fn short_name(self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($variant), )+
                }
            }

            /// Catalog entry for this right.
            #[inline]
            #[must_use]
            pub const fn definition(self) -> &'static RightDefinition {
                match self {
                    $( Self::$variant => &RightDefinition {
                        right: Self::$variant,
                        short_name: stringify!($variant),
                        display_name: $display,
                        description: $description,
                    }, )+
                }
            }
        }
    };
}

user_rights! {
    /// Access Credential Manager as a trusted caller
    SeTrustedCredManAccessPrivilege => "Access Credential Manager as a trusted caller",
        "Used by Credential Manager during backup and restore.";
    /// Access this computer from the network
    SeNetworkLogonRight => "Access this computer from the network",
        "Connect to the computer over the network.";
    /// Act as part of the operating system
    SeTcbPrivilege => "Act as part of the operating system",
        "Act as a fully trusted part of the operating system and impersonate any user.";
    /// Add workstations to domain
    SeMachineAccountPrivilege => "Add workstations to domain",
        "Create computer accounts in the domain.";
    /// Adjust memory quotas for a process
    SeIncreaseQuotaPrivilege => "Adjust memory quotas for a process",
        "Change the maximum memory that can be consumed by a process.";
    /// Allow log on locally
    SeInteractiveLogonRight => "Allow log on locally",
        "Start an interactive session on the computer.";
    /// Allow log on through Remote Desktop Services
    SeRemoteInteractiveLogonRight => "Allow log on through Remote Desktop Services",
        "Log on through Remote Desktop Services.";
    /// Back up files and directories
    SeBackupPrivilege => "Back up files and directories",
        "Bypass file and directory permissions to back up the system.";
    /// Bypass traverse checking
    SeChangeNotifyPrivilege => "Bypass traverse checking",
        "Traverse directory trees without traverse permission.";
    /// Change the system time
    SeSystemtimePrivilege => "Change the system time",
        "Change the date and time of the internal clock.";
    /// Change the time zone
    SeTimeZonePrivilege => "Change the time zone",
        "Adjust the time zone used to display local time.";
    /// Create a pagefile
    SeCreatePagefilePrivilege => "Create a pagefile",
        "Create and change the size of a pagefile.";
    /// Create a token object
    SeCreateTokenPrivilege => "Create a token object",
        "Create access tokens usable to access any local resource.";
    /// Create global objects
    SeCreateGlobalPrivilege => "Create global objects",
        "Create global objects available to all sessions.";
    /// Create permanent shared objects
    SeCreatePermanentPrivilege => "Create permanent shared objects",
        "Create directory objects in the object manager.";
    /// Create symbolic links
    SeCreateSymbolicLinkPrivilege => "Create symbolic links",
        "Create symbolic links.";
    /// Debug programs
    SeDebugPrivilege => "Debug programs",
        "Attach a debugger to or open any process, including those of other users.";
    /// Deny access to this computer from the network
    SeDenyNetworkLogonRight => "Deny access to this computer from the network",
        "Prevent network access to the computer.";
    /// Deny log on as a batch job
    SeDenyBatchLogonRight => "Deny log on as a batch job",
        "Prevent logging on through a batch-queue facility.";
    /// Deny log on as a service
    SeDenyServiceLogonRight => "Deny log on as a service",
        "Prevent registering a process as a service.";
    /// Deny log on locally
    SeDenyInteractiveLogonRight => "Deny log on locally",
        "Prevent interactive logons at the computer.";
    /// Deny log on through Remote Desktop Services
    SeDenyRemoteInteractiveLogonRight => "Deny log on through Remote Desktop Services",
        "Prevent logging on through Remote Desktop Services.";
    /// Enable computer and user accounts to be trusted for delegation
    SeEnableDelegationPrivilege => "Enable computer and user accounts to be trusted for delegation",
        "Set the Trusted for Delegation flag on user and computer objects.";
    /// Force shutdown from a remote system
    SeRemoteShutdownPrivilege => "Force shutdown from a remote system",
        "Shut down the computer from a remote location on the network.";
    /// Generate security audits
    SeAuditPrivilege => "Generate security audits",
        "Add entries to the security log.";
    /// Impersonate a client after authentication
    SeImpersonatePrivilege => "Impersonate a client after authentication",
        "Impersonate other accounts after they authenticate.";
    /// Increase a process working set
    SeIncreaseWorkingSetPrivilege => "Increase a process working set",
        "Increase or decrease the working set of a process.";
    /// Increase scheduling priority
    SeIncreaseBasePriorityPrivilege => "Increase scheduling priority",
        "Raise the base priority class of a process.";
    /// Load and unload device drivers
    SeLoadDriverPrivilege => "Load and unload device drivers",
        "Dynamically load and unload device drivers.";
    /// Lock pages in memory
    SeLockMemoryPrivilege => "Lock pages in memory",
        "Keep data in physical memory instead of paging it to disk.";
    /// Log on as a batch job
    SeBatchLogonRight => "Log on as a batch job",
        "Log on through a batch-queue facility such as the Task Scheduler.";
    /// Log on as a service
    SeServiceLogonRight => "Log on as a service",
        "Register a process as a service.";
    /// Manage auditing and security log
    SeSecurityPrivilege => "Manage auditing and security log",
        "Specify object access auditing and view or clear the security log.";
    /// Modify an object label
    SeRelabelPrivilege => "Modify an object label",
        "Modify the integrity label of objects owned by other users.";
    /// Modify firmware environment values
    SeSystemEnvironmentPrivilege => "Modify firmware environment values",
        "Modify firmware environment variables.";
    /// Perform volume maintenance tasks
    SeManageVolumePrivilege => "Perform volume maintenance tasks",
        "Run maintenance tasks such as defragmentation on a volume.";
    /// Profile single process
    SeProfileSingleProcessPrivilege => "Profile single process",
        "Monitor the performance of non-system processes.";
    /// Profile system performance
    SeSystemProfilePrivilege => "Profile system performance",
        "Monitor the performance of system processes.";
    /// Remove computer from docking station
    SeUndockPrivilege => "Remove computer from docking station",
        "Undock a portable computer without logging on.";
    /// Replace a process level token
    SeAssignPrimaryTokenPrivilege => "Replace a process level token",
        "Replace the access token associated with a child process.";
    /// Restore files and directories
    SeRestorePrivilege => "Restore files and directories",
        "Bypass file and directory permissions when restoring backed-up files.";
    /// Shut down the system
    SeShutdownPrivilege => "Shut down the system",
        "Shut down the local computer.";
    /// Synchronize directory service data
    SeSyncAgentPrivilege => "Synchronize directory service data",
        "Read all objects and properties in the directory regardless of protection.";
    /// Take ownership of files or other objects
    SeTakeOwnershipPrivilege => "Take ownership of files or other objects",
        "Take ownership of any securable object in the system.";
    /// Obtain an impersonation token for another user in the same session
    SeDelegateSessionUserImpersonatePrivilege => "Obtain an impersonation token for another user in the same session",
        "Obtain an impersonation token for another user logged on in the same session.";
}

impl fmt::Display for UserRight {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Returned when a string names no known right.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown user right {0:?}")]
pub struct UnknownRight(pub String);

impl FromStr for UserRight {
    type Err = UnknownRight;

    /// Parses the short name, compared ordinally.
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.short_name() == s)
            .ok_or_else(|| UnknownRight(s.to_owned()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UserRight {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.short_name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UserRight {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_is_total_and_consistent() {
        assert_eq!(UserRight::ALL.len(), 45);
        for &right in UserRight::ALL {
            let def = right.definition();
            assert_eq!(def.right, right);
            assert_eq!(def.short_name, right.short_name());
            assert!(!def.display_name.is_empty());
            assert!(!def.description.is_empty());
        }
    }

    #[test]
    fn short_names_are_unique_and_parse_back() {
        let names: HashSet<_> = UserRight::ALL.iter().map(|r| r.short_name()).collect();
        assert_eq!(names.len(), UserRight::ALL.len());
        for &right in UserRight::ALL {
            assert_eq!(right.short_name().parse::<UserRight>().unwrap(), right);
        }
    }

    #[test]
    fn parsing_is_ordinal() {
        assert!("sedebugprivilege".parse::<UserRight>().is_err());
        assert_eq!(
            "SeServiceLogonRight".parse::<UserRight>(),
            Ok(UserRight::SeServiceLogonRight)
        );
    }

    #[test]
    fn display_is_short_name() {
        assert_eq!(UserRight::SeBatchLogonRight.to_string(), "SeBatchLogonRight");
        assert_eq!(
            UserRight::SeBatchLogonRight.definition().display_name,
            "Log on as a batch job"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_short_name() {
        use serde_test::{Token, assert_tokens};
        assert_tokens(
            &UserRight::SeDebugPrivilege,
            &[Token::Str("SeDebugPrivilege")],
        );
    }
}
