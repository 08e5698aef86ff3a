/// `POLICY_ALL_ACCESS`: enumerate, lookup and modify in one handle.
pub const POLICY_ALL_ACCESS: u32 = 0x000F_0FFF;

/// How a [`PolicyClient`](crate::PolicyClient) opens its policy handle.
///
/// # Examples
/// ```rust
/// # use win_user_rights::ClientOptions;
/// let options = ClientOptions::DEFAULT.with_system_name("FILESRV01");
/// assert_eq!(options.target(), Some("FILESRV01"));
/// assert_eq!(ClientOptions::DEFAULT.with_system_name("").target(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientOptions {
    /// Target machine; `None` or empty selects the local machine.
    pub system_name: Option<String>,
    /// Access mask requested from `LsaOpenPolicy`.
    pub desired_access: u32,
}

impl ClientOptions {
    /// Local machine, [`POLICY_ALL_ACCESS`].
    pub const DEFAULT: Self = Self {
        system_name: None,
        desired_access: POLICY_ALL_ACCESS,
    };

    /// Targets `system_name` (NetBIOS or DNS name).
    #[inline]
    #[must_use]
    pub fn with_system_name<S: Into<String>>(mut self, system_name: S) -> Self {
        self.system_name = Some(system_name.into());
        self
    }

    /// Requests a different access mask.
    #[inline]
    #[must_use]
    pub const fn with_desired_access(mut self, desired_access: u32) -> Self {
        self.desired_access = desired_access;
        self
    }

    /// The remote machine name, `None` for the local machine.
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.system_name.as_deref().filter(|name| !name.is_empty())
    }
}

impl Default for ClientOptions {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_local_machine() {
        let options = ClientOptions::default();
        assert_eq!(options.target(), None);
        assert_eq!(options.desired_access, POLICY_ALL_ACCESS);
        assert_eq!(
            options.with_desired_access(0x0800).desired_access,
            0x0800
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_partial_config() {
        let options: ClientOptions =
            serde_json::from_str(r#"{"system_name":"DC01"}"#).unwrap();
        assert_eq!(options.target(), Some("DC01"));
        assert_eq!(options.desired_access, POLICY_ALL_ACCESS);
    }
}
