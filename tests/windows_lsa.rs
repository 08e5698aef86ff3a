// Live checks against the local LSA policy. Reads are attempted everywhere;
// a non-elevated run may be refused and that is accepted.
#![cfg(windows)]
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]

use win_user_rights::{
    ClientOptions, Error, PolicyClient, SecurityIdentifier, UserRight, UserRightExt, UserRights,
};

fn open_local() -> Option<UserRights<win_user_rights::LsaPolicy>> {
    match UserRights::open(None) {
        Ok(rights) => Some(rights),
        Err(Error::AccessDenied) => None,
        Err(err) => Err(err).unwrap(),
    }
}

#[test]
fn resolves_builtin_names() {
    let Some(rights) = open_local() else { return };
    let admins = rights.client().resolve("BUILTIN\\Administrators").unwrap();
    assert_eq!(admins.to_string(), "S-1-5-32-544");
    let everyone: SecurityIdentifier = "S-1-1-0".parse().unwrap();
    assert_eq!(rights.client().resolve("S-1-1-0").unwrap(), everyone);
    assert_eq!(
        rights.client().resolve("S-1-5-x"),
        Err(Error::InvalidSidFormat("S-1-5-x".to_owned()))
    );
    rights.dispose();
}

#[test]
fn enumerates_a_common_right() {
    let Some(rights) = open_local() else { return };
    match rights.principals(UserRight::SeChangeNotifyPrivilege) {
        Ok(principals) => assert!(principals.iter().all(|p| !p.sid.is_empty())),
        Err(Error::AccessDenied) => {}
        Err(err) => Err(err).unwrap(),
    }
    rights.dispose();
    assert_eq!(
        rights.principals(UserRight::SeChangeNotifyPrivilege),
        Err(Error::Disposed)
    );
}

#[test]
fn short_lived_client_reads_state() {
    match UserRight::SeServiceLogonRight.state_on(None) {
        Ok(state) => assert_eq!(state.short_name, "SeServiceLogonRight"),
        Err(Error::AccessDenied) => {}
        Err(err) => Err(err).unwrap(),
    }
}

#[test]
fn explicit_options_open_the_local_machine() {
    let options = ClientOptions::DEFAULT.with_system_name("");
    match PolicyClient::open(&options) {
        Ok(client) => client.dispose(),
        Err(Error::AccessDenied) => {}
        Err(err) => Err(err).unwrap(),
    }
}
