use std::env;
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::config::LaunchConfig;
use crate::venv::VirtualEnv;

/// Build the server command: the venv's python running uvicorn on host:port
pub fn server_command(config: &LaunchConfig) -> Command {
    let venv = VirtualEnv::new(config.venv_path());
    let inherited_path = env::var("PATH").ok();

    let mut command = Command::new(venv.python());
    command
        .args(["-m", "uvicorn"])
        .arg(&config.app_module)
        .arg("--host")
        .arg(&config.host)
        .arg("--port")
        .arg(config.port.to_string())
        .current_dir(&config.project_dir)
        .envs(venv.activation_env(inherited_path.as_deref()))
        .env_remove("PYTHONHOME");

    if let Some(level) = &config.log_level {
        command.env("LOGLEVEL", level);
    }

    command
}

/// Replace the current process with `command`.
///
/// Only returns if the exec itself failed.
pub fn exec(mut command: Command) -> anyhow::Error {
    let program = command.get_program().to_string_lossy().into_owned();
    tracing::info!("Handing off to {}", program);

    let err = command.exec();
    anyhow::anyhow!("Failed to exec {}: {}", program, err)
}
