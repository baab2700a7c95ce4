//! Configuration for both programs.
//!
//! Every default lives in a `Default` impl here. Environment variables are
//! read once at the entry point through [`InstallConfig::from_lookup`] and
//! [`LaunchConfig::from_lookup`]; nothing below the binaries touches the
//! process environment.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BootError;
use crate::paths;

/// Restart policy written to the unit's `Restart=` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicy {
    No,
    OnFailure,
    #[default]
    Always,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartPolicy::No => "no",
            RestartPolicy::OnFailure => "on-failure",
            RestartPolicy::Always => "always",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallConfig {
    pub service_name: String,
    pub description: String,
    pub project_dir: PathBuf,
    pub launcher: PathBuf,
    pub unit_dir: PathBuf,
    /// Reload and enable through the init system after writing the unit.
    /// Off when `unit_dir` is outside systemd's search path.
    pub register: bool,
    pub restart: RestartPolicy,
    pub restart_sec: u32,
    /// Single `Environment=` assignment handed to the server process
    pub environment: (String, String),
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            service_name: paths::SERVICE_NAME.into(),
            description: "Pi-hole MCP OpenAPI wrapper".into(),
            project_dir: PathBuf::new(),
            launcher: PathBuf::from(paths::LAUNCHER_BIN),
            unit_dir: PathBuf::from(paths::SYSTEMD_UNIT_DIR),
            register: true,
            restart: RestartPolicy::Always,
            restart_sec: 3,
            environment: ("DISABLE_MAIN_SIGNAL_HANDLER".into(), "1".into()),
        }
    }
}

impl InstallConfig {
    /// Resolve from the process environment.
    ///
    /// The project directory defaults to the current directory and the
    /// launcher to `apiboot-launch` next to the running executable.
    pub fn from_env() -> Result<Self> {
        let cwd = env::current_dir().context("Failed to determine current directory")?;
        let exe = env::current_exe().context("Failed to locate running executable")?;
        let launcher = exe.with_file_name(paths::LAUNCHER_BIN);
        Self::from_lookup(|key| env::var(key).ok(), &cwd, &launcher)
    }

    pub fn from_lookup<F>(lookup: F, cwd: &Path, default_launcher: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("APIBOOT_SERVICE") {
            validate_service_name(&name)?;
            config.service_name = name;
        }

        config.project_dir = match lookup("APIBOOT_PROJECT_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => cwd.to_path_buf(),
        };
        if config.project_dir.is_relative() {
            config.project_dir = cwd.join(&config.project_dir);
        }
        config.project_dir = canonical_or_given(config.project_dir);

        config.launcher = match lookup("APIBOOT_LAUNCHER") {
            Some(path) => config.project_dir.join(path),
            None => default_launcher.to_path_buf(),
        };

        if let Some(dir) = lookup("APIBOOT_UNIT_DIR") {
            config.unit_dir = PathBuf::from(dir);
        }
        config.register = config.registers_with_init();

        Ok(config)
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{}.service", self.service_name))
    }

    /// Whether systemd will find the unit, so reload and enable make sense.
    /// Any other `unit_dir` only stages the file.
    pub fn registers_with_init(&self) -> bool {
        paths::SYSTEMD_SEARCH_PATH
            .iter()
            .any(|dir| self.unit_dir == Path::new(dir))
    }
}

/// Resolve symlinks and `..` when the path exists; a missing project
/// directory is left as given and surfaces when systemd starts the unit
fn canonical_or_given(path: PathBuf) -> PathBuf {
    match fs::canonicalize(&path) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::debug!("Keeping {} as given: {}", path.display(), e);
            path
        }
    }
}

fn validate_service_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));

    if !ok {
        return Err(BootError::InvalidSetting {
            name: "APIBOOT_SERVICE",
            value: name.to_string(),
            reason: "unit names may only contain ASCII letters, digits, '-', '_', '.' and '@'"
                .into(),
        }
        .into());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchConfig {
    pub host: String,
    pub port: u16,
    pub python: String,
    pub project_dir: PathBuf,
    pub venv_dir: PathBuf,
    pub app_module: String,
    pub log_level: Option<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            python: "python3".into(),
            project_dir: PathBuf::new(),
            venv_dir: PathBuf::from(paths::VENV_DIR),
            app_module: "api_wrapper:app".into(),
            log_level: None,
        }
    }
}

impl LaunchConfig {
    pub fn from_env() -> Result<Self> {
        let cwd = env::current_dir().context("Failed to determine current directory")?;
        Self::from_lookup(|key| env::var(key).ok(), &cwd)
    }

    pub fn from_lookup<F>(lookup: F, project_dir: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            project_dir: project_dir.to_path_buf(),
            ..Self::default()
        };

        if let Some(port) = lookup("PORT") {
            config.port = parse_port(&port)?;
        }
        if let Some(host) = lookup("HOST") {
            if host.trim().is_empty() {
                return Err(BootError::InvalidSetting {
                    name: "HOST",
                    value: host,
                    reason: "bind host must not be empty".into(),
                }
                .into());
            }
            config.host = host;
        }
        if let Some(python) = lookup("PYTHON_BIN") {
            config.python = python;
        }
        if let Some(dir) = lookup("VENV_DIR") {
            config.venv_dir = PathBuf::from(dir);
        }
        if let Some(module) = lookup("APP_MODULE") {
            config.app_module = module;
        }
        config.log_level = lookup("LOGLEVEL");

        Ok(config)
    }

    /// Virtualenv location, anchored at the project directory when relative
    pub fn venv_path(&self) -> PathBuf {
        if self.venv_dir.is_absolute() {
            self.venv_dir.clone()
        } else {
            self.project_dir.join(&self.venv_dir)
        }
    }

    pub fn wrapper_manifest(&self) -> PathBuf {
        self.project_dir.join(paths::WRAPPER_MANIFEST)
    }

    pub fn project_manifest(&self) -> PathBuf {
        self.project_dir.join(paths::PROJECT_MANIFEST)
    }
}

fn parse_port(value: &str) -> Result<u16> {
    match value.trim().parse::<u16>() {
        Ok(0) => Err(BootError::InvalidSetting {
            name: "PORT",
            value: value.to_string(),
            reason: "port 0 is not a bindable service port".into(),
        }
        .into()),
        Ok(port) => Ok(port),
        Err(e) => Err(BootError::InvalidSetting {
            name: "PORT",
            value: value.to_string(),
            reason: e.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn launch_defaults() {
        let config = LaunchConfig::from_lookup(lookup_from(&[]), Path::new("/srv/app")).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.python, "python3");
        assert_eq!(config.app_module, "api_wrapper:app");
        assert_eq!(config.venv_path(), PathBuf::from("/srv/app/.venv"));
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn launch_overrides_from_environment() {
        let config = LaunchConfig::from_lookup(
            lookup_from(&[
                ("PORT", "9999"),
                ("HOST", "127.0.0.1"),
                ("PYTHON_BIN", "python3.12"),
                ("VENV_DIR", "/opt/venv"),
                ("LOGLEVEL", "debug"),
            ]),
            Path::new("/srv/app"),
        )
        .unwrap();
        assert_eq!(config.port, 9999);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.python, "python3.12");
        assert_eq!(config.venv_path(), PathBuf::from("/opt/venv"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = LaunchConfig::from_lookup(lookup_from(&[("PORT", "http")]), Path::new("/srv"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BootError>(),
            Some(BootError::InvalidSetting { name: "PORT", .. })
        ));

        assert!(
            LaunchConfig::from_lookup(lookup_from(&[("PORT", "70000")]), Path::new("/srv"))
                .is_err()
        );
        assert!(
            LaunchConfig::from_lookup(lookup_from(&[("PORT", "0")]), Path::new("/srv")).is_err()
        );
    }

    #[test]
    fn manifests_live_in_project_dir() {
        let config = LaunchConfig::from_lookup(lookup_from(&[]), Path::new("/srv/app")).unwrap();
        assert_eq!(
            config.wrapper_manifest(),
            PathBuf::from("/srv/app/requirements-openapi.txt")
        );
        assert_eq!(
            config.project_manifest(),
            PathBuf::from("/srv/app/requirements.txt")
        );
    }

    #[test]
    fn install_defaults() {
        let config = InstallConfig::from_lookup(
            lookup_from(&[]),
            Path::new("/srv/app"),
            Path::new("/usr/local/bin/apiboot-launch"),
        )
        .unwrap();
        assert_eq!(config.service_name, "pihole-mcp-openapi");
        assert_eq!(config.project_dir, PathBuf::from("/srv/app"));
        assert_eq!(
            config.launcher,
            PathBuf::from("/usr/local/bin/apiboot-launch")
        );
        assert_eq!(
            config.unit_path(),
            PathBuf::from("/etc/systemd/system/pihole-mcp-openapi.service")
        );
        assert!(config.registers_with_init());
        assert!(config.register);
        assert_eq!(config.restart, RestartPolicy::Always);
    }

    #[test]
    fn install_relative_paths_anchor_at_project_dir() {
        let config = InstallConfig::from_lookup(
            lookup_from(&[
                ("APIBOOT_PROJECT_DIR", "app"),
                ("APIBOOT_LAUNCHER", "bin/launch"),
                ("APIBOOT_UNIT_DIR", "/tmp/units"),
            ]),
            Path::new("/srv"),
            Path::new("/unused"),
        )
        .unwrap();
        assert_eq!(config.project_dir, PathBuf::from("/srv/app"));
        assert_eq!(config.launcher, PathBuf::from("/srv/app/bin/launch"));
        assert!(!config.registers_with_init());
        assert!(!config.register);
    }

    #[test]
    fn project_dir_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("app")).unwrap();
        fs::create_dir(dir.path().join("other")).unwrap();

        let config = InstallConfig::from_lookup(
            lookup_from(&[("APIBOOT_PROJECT_DIR", "other/../app")]),
            dir.path(),
            Path::new("/unused"),
        )
        .unwrap();

        let expected = fs::canonicalize(dir.path().join("app")).unwrap();
        assert_eq!(config.project_dir, expected);
        assert!(!config.project_dir.to_string_lossy().contains(".."));
    }

    #[test]
    fn alternate_systemd_dirs_still_register() {
        let config = InstallConfig {
            unit_dir: PathBuf::from("/run/systemd/system"),
            ..InstallConfig::default()
        };
        assert!(config.registers_with_init());
    }

    #[test]
    fn install_rejects_bad_service_name() {
        let result = InstallConfig::from_lookup(
            lookup_from(&[("APIBOOT_SERVICE", "bad name/..")]),
            Path::new("/srv"),
            Path::new("/unused"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn restart_policy_strings() {
        assert_eq!(RestartPolicy::No.as_str(), "no");
        assert_eq!(RestartPolicy::OnFailure.as_str(), "on-failure");
        assert_eq!(RestartPolicy::Always.as_str(), "always");
    }
}
