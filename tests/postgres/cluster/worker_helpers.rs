//! Discovery and preparation of the `pg_worker` binary for root test runs.

use super::fs_utils::open_parent_dir;
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use cap_std::fs::{Permissions, PermissionsExt};
use std::collections::BTreeMap;
use std::env;
use std::io::ErrorKind;
use std::sync::{Mutex, PoisonError};

static PREPARED: Mutex<BTreeMap<Utf8PathBuf, Utf8PathBuf>> = Mutex::new(BTreeMap::new());

/// Finds the worker built alongside this test binary, then on `PATH`.
pub(super) fn locate_pg_worker() -> Option<Utf8PathBuf> {
    option_env!("CARGO_BIN_EXE_pg_worker")
        .map(Utf8PathBuf::from)
        .filter(|path| path.is_file())
        .or_else(near_test_binary)
        .or_else(on_path)
}

fn near_test_binary() -> Option<Utf8PathBuf> {
    let exe = Utf8PathBuf::try_from(env::current_exe().ok()?).ok()?;
    let candidate = exe.parent()?.parent()?.join("pg_worker");
    candidate.is_file().then_some(candidate)
}

fn on_path() -> Option<Utf8PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .filter_map(|dir| Utf8PathBuf::try_from(dir).ok())
        .map(|dir| dir.join("pg_worker"))
        .find(|candidate| candidate.is_file())
}

/// Copies `worker` into the temporary directory with world-executable
/// permissions, since the cluster runs as `nobody` and cannot reach the
/// build directory.
///
/// Repeated calls for the same worker reuse the first copy.
pub(super) fn prepare_pg_worker(worker: &Utf8Path) -> eyre::Result<Utf8PathBuf> {
    let mut prepared = PREPARED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(copy) = prepared.get(worker) {
        return Ok(copy.clone());
    }

    let temp_dir = Utf8PathBuf::try_from(env::temp_dir())?;
    let destination = temp_dir.join(format!(
        "strata_pg_worker_{}_{}",
        std::process::id(),
        prepared.len()
    ));
    let (source_dir, source_name) = open_parent_dir(worker)?;
    let (target_dir, target_name) = open_parent_dir(&destination)?;
    match target_dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    source_dir.copy(source_name, &target_dir, target_name)?;
    #[cfg(unix)]
    target_dir.set_permissions(target_name, Permissions::from_mode(0o755))?;

    prepared.insert(worker.to_path_buf(), destination.clone());
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::{locate_pg_worker, prepare_pg_worker};
    use camino::Utf8PathBuf;
    use cap_std::ambient_authority;
    use cap_std::fs_utf8::Dir;
    use std::io::Write;

    fn scratch_worker() -> eyre::Result<Utf8PathBuf> {
        let temp_dir = Utf8PathBuf::try_from(std::env::temp_dir())?;
        let name = format!("pg_worker_source_{}", uuid::Uuid::new_v4().simple());
        let dir = Dir::open_ambient_dir(&temp_dir, ambient_authority())?;
        let mut file = dir.create(&name)?;
        file.write_all(b"#!/bin/sh\nexit 0\n")?;
        Ok(temp_dir.join(name))
    }

    #[test]
    fn worker_built_with_the_tests_is_found() {
        let located = locate_pg_worker();
        assert!(located.is_some_and(|path| path.is_file()));
    }

    #[test]
    fn prepared_worker_is_reused_and_executable() -> eyre::Result<()> {
        let source = scratch_worker()?;

        let first = prepare_pg_worker(&source)?;
        let second = prepare_pg_worker(&source)?;

        assert_eq!(first, second);
        assert_ne!(first, source);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(first.as_std_path())?.permissions().mode();
            assert_ne!(mode & 0o111, 0, "mode {mode:o} is not executable");
        }
        Ok(())
    }
}
