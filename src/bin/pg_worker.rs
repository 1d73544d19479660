//! Runs embedded `PostgreSQL` lifecycle steps for the integration test
//! cluster when the test binary itself runs as root.
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```
//!
//! The payload is a serialised `WorkerPayload` from `pg-embed-setup-unpriv`
//! holding the cluster settings and environment overrides. Root privileges
//! are dropped to `nobody` before the payload settings are applied.

#[cfg(unix)]
mod worker {
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use std::io::Read;
    use thiserror::Error;

    const UNPRIVILEGED_USER: &str = "nobody";

    type BoxError = Box<dyn std::error::Error + Send + Sync>;

    /// Failures of a worker invocation.
    #[derive(Debug, Error)]
    pub enum WorkerError {
        #[error("invalid arguments: {0}")]
        InvalidArgs(String),
        #[error("failed to read payload: {0}")]
        PayloadRead(#[source] BoxError),
        #[error("failed to parse payload: {0}")]
        PayloadParse(#[from] serde_json::Error),
        #[error("invalid cluster settings: {0}")]
        Settings(String),
        #[error("failed to drop privileges: {0}")]
        PrivilegeDrop(String),
        #[error("runtime init failed: {0}")]
        Runtime(#[source] std::io::Error),
        #[error("postgres operation failed: {0}")]
        Postgres(String),
    }

    /// Lifecycle step requested by the test harness.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl TryFrom<&str> for Operation {
        type Error = WorkerError;

        fn try_from(value: &str) -> Result<Self, WorkerError> {
            match value {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::InvalidArgs(format!(
                    "unknown operation '{other}'; expected setup, start or stop"
                ))),
            }
        }
    }

    pub fn collect_args() -> Result<Vec<String>, WorkerError> {
        env::args_os()
            .skip(1)
            .map(|arg| {
                arg.into_string()
                    .map_err(|_| WorkerError::InvalidArgs("argument is not valid UTF-8".to_owned()))
            })
            .collect()
    }

    /// Splits `<operation> <payload-path>` with no trailing arguments.
    pub fn parse_args(args: &[String]) -> Result<(Operation, Utf8PathBuf), WorkerError> {
        match args {
            [operation, payload] => Ok((
                Operation::try_from(operation.as_str())?,
                Utf8PathBuf::from(payload),
            )),
            [] | [_] => Err(WorkerError::InvalidArgs(
                "expected an operation and a payload path".to_owned(),
            )),
            [_, _, extra, ..] => Err(WorkerError::InvalidArgs(format!(
                "unexpected extra argument: {extra}"
            ))),
        }
    }

    pub fn run(args: &[String]) -> Result<(), WorkerError> {
        let (operation, payload_path) = parse_args(args)?;
        let payload = load_payload(&payload_path)?;
        drop_privileges_if_root()?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Settings(err.to_string()))?;
        apply_environment(&payload.environment);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)?;
        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(async {
            match operation {
                Operation::Setup => postgres.setup().await.map_err(postgres_error),
                Operation::Start => {
                    if matches!(postgres.status(), Status::Started) {
                        return Ok(());
                    }
                    postgres.start().await.map_err(postgres_error)
                }
                Operation::Stop => postgres.stop().await.map_err(postgres_error),
            }
        })?;

        if operation == Operation::Start {
            // Dropping the handle stops the server the harness is about to use.
            std::mem::forget(postgres);
        }
        Ok(())
    }

    fn postgres_error(err: postgresql_embedded::Error) -> WorkerError {
        WorkerError::Postgres(err.to_string())
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let bytes = read_payload(path).map_err(WorkerError::PayloadRead)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn read_payload(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
        let (dir, relative) = ambient_dir_and_path(path)?;
        let mut file = dir.open(relative.as_std_path())?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn drop_privileges_if_root() -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let privilege_error = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());
        let user = User::from_name(UNPRIVILEGED_USER)
            .map_err(privilege_error)?
            .ok_or_else(|| {
                WorkerError::PrivilegeDrop(format!("user '{UNPRIVILEGED_USER}' not found"))
            })?;
        let name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
        initgroups(&name, user.gid).map_err(privilege_error)?;
        setgid(user.gid).map_err(privilege_error)?;
        setuid(user.uid).map_err(privilege_error)?;

        // SAFETY: the worker is single-threaded until the runtime is built.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: the worker is single-threaded until the runtime is built.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), worker::WorkerError> {
    let args = worker::collect_args()?;
    worker::run(&args)
}

#[cfg(not(unix))]
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    Err("pg_worker is only supported on Unix platforms".into())
}
