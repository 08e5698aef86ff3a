use crate::reconcile::SetResult;
use crate::{Error, LsaPolicy, RightState, UserRight, UserRights};

/// One-shot operations on a [`UserRight`], each opening and closing its own policy handle.
///
/// `system_name` selects a remote machine; `None` or an empty name means
/// the local one.
pub trait UserRightExt: Copy {
    /// Current state of the right.
    ///
    /// # Errors
    /// A failure to open the policy, or see [`UserRights::state`].
    ///
    /// # Examples
    /// ```no_run
    /// # #[cfg(windows)]
    /// # {
    /// use win_user_rights::{UserRight, UserRightExt};
    /// let state = UserRight::SeServiceLogonRight.state_on(None).unwrap();
    /// log::info!("{state}");
    /// # }
    /// ```
    fn state_on(self, system_name: Option<&str>) -> Result<RightState, Error>;

    /// Grants the right to `principals`.
    ///
    /// # Errors
    /// A failure to open the policy, or see [`UserRights::add`].
    fn grant_on<I>(self, system_name: Option<&str>, principals: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>;

    /// Removes the right from `principals`.
    ///
    /// # Errors
    /// A failure to open the policy, or see [`UserRights::remove`].
    fn revoke_on<I>(self, system_name: Option<&str>, principals: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>;

    /// Makes the holders of the right exactly `desired`.
    ///
    /// # Errors
    /// A failure to open the policy, or see [`UserRights::set`].
    fn set_on<S: AsRef<str>>(
        self,
        system_name: Option<&str>,
        desired: &[S],
    ) -> Result<SetResult, Error>;
}

fn with_rights<T>(
    system_name: Option<&str>,
    f: impl FnOnce(&UserRights<LsaPolicy>) -> Result<T, Error>,
) -> Result<T, Error> {
    let rights = UserRights::open(system_name)?;
    let result = f(&rights);
    rights.dispose();
    result
}

impl UserRightExt for UserRight {
    #[inline]
    fn state_on(self, system_name: Option<&str>) -> Result<RightState, Error> {
        with_rights(system_name, |rights| rights.state(self))
    }

    #[inline]
    fn grant_on<I>(self, system_name: Option<&str>, principals: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        with_rights(system_name, |rights| rights.add(self, principals))
    }

    #[inline]
    fn revoke_on<I>(self, system_name: Option<&str>, principals: I) -> Result<(), Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        with_rights(system_name, |rights| rights.remove(self, principals))
    }

    #[inline]
    fn set_on<S: AsRef<str>>(
        self,
        system_name: Option<&str>,
        desired: &[S],
    ) -> Result<SetResult, Error> {
        with_rights(system_name, |rights| rights.set(self, desired))
    }
}
