//! Environment preparation for the embedded cluster bootstrap.

use super::worker_helpers::{locate_pg_worker, prepare_pg_worker};
use eyre::eyre;
use pg_embedded_setup_unpriv::{ExecutionPrivileges, detect_execution_privileges};
use std::ffi::OsString;
use std::net::TcpListener;

pub(super) fn env_vars_to_os(
    env_vars: &[(String, Option<String>)],
) -> Vec<(OsString, Option<OsString>)> {
    env_vars
        .iter()
        .map(|(key, value)| (OsString::from(key), value.as_ref().map(OsString::from)))
        .collect()
}

/// Variables the bootstrap needs on top of the caller's environment.
///
/// A free port is reserved unless `PG_PORT` is set, and root runs get a
/// `PG_EMBEDDED_WORKER` pointing at a copy of `pg_worker` that the
/// unprivileged user can execute.
pub(super) fn worker_env_changes() -> eyre::Result<Vec<(OsString, Option<OsString>)>> {
    let mut changes = Vec::new();
    if std::env::var_os("PG_PORT").is_none() {
        changes.push((OsString::from("PG_PORT"), Some(free_port()?)));
    }

    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && std::env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        let worker = locate_pg_worker()
            .ok_or_else(|| eyre!("PG_EMBEDDED_WORKER is not set and pg_worker was not found"))?;
        let prepared = prepare_pg_worker(&worker)?;
        changes.push((
            OsString::from("PG_EMBEDDED_WORKER"),
            Some(OsString::from(prepared.as_str())),
        ));
    }
    Ok(changes)
}

fn free_port() -> eyre::Result<OsString> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    Ok(OsString::from(port.to_string()))
}
