use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{InstallConfig, RestartPolicy};

/// Declarative description of the service, rendered as a systemd unit file
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDescriptor {
    pub name: String,
    pub description: String,
    pub working_directory: PathBuf,
    pub exec_start: PathBuf,
    pub restart: RestartPolicy,
    pub restart_sec: u32,
    pub environment: (String, String),
    pub wanted_by: String,
}

impl UnitDescriptor {
    pub fn for_service(config: &InstallConfig) -> Self {
        Self {
            name: config.service_name.clone(),
            description: config.description.clone(),
            working_directory: config.project_dir.clone(),
            exec_start: config.launcher.clone(),
            restart: config.restart,
            restart_sec: config.restart_sec,
            environment: config.environment.clone(),
            wanted_by: "multi-user.target".into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.service", self.name)
    }

    /// Render the unit file. Output depends only on the descriptor's fields.
    pub fn render(&self) -> String {
        let (env_key, env_value) = &self.environment;

        format!(
            "# {name}.service - generated by apiboot-install\n\
             [Unit]\n\
             Description={description}\n\
             After=network-online.target\n\
             Wants=network-online.target\n\
             \n\
             [Service]\n\
             Type=simple\n\
             WorkingDirectory={workdir}\n\
             ExecStart={exec}\n\
             Restart={restart}\n\
             RestartSec={restart_sec}\n\
             Environment={env_key}={env_value}\n\
             \n\
             [Install]\n\
             WantedBy={wanted_by}\n",
            name = self.name,
            description = self.description,
            workdir = escape_specifiers(&self.working_directory.to_string_lossy()),
            exec = exec_path(&self.exec_start),
            restart = self.restart.as_str(),
            restart_sec = self.restart_sec,
            env_key = env_key,
            env_value = env_value,
            wanted_by = self.wanted_by,
        )
    }

    /// Write the unit into `unit_dir`, replacing any previous version.
    pub fn write(&self, unit_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(unit_dir)
            .with_context(|| format!("Failed to create {}", unit_dir.display()))?;

        let path = unit_dir.join(self.file_name());
        fs::write(&path, self.render())
            .with_context(|| format!("Failed to write unit file {}", path.display()))?;

        Ok(path)
    }
}

/// systemd expands `%` specifiers in path-valued keys
fn escape_specifiers(value: &str) -> String {
    value.replace('%', "%%")
}

/// ExecStart is split on whitespace and C-unescaped; only this key accepts quotes
fn exec_path(path: &Path) -> String {
    let s = escape_specifiers(&path.to_string_lossy());
    if s.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\') {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s
    }
}
