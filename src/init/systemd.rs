use super::InitSystem;
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::cmd;

/// systemd, driven through `systemctl`
#[derive(Debug, Clone)]
pub struct Systemd {
    systemctl: PathBuf,
}

impl Systemd {
    /// Locate `systemctl` on PATH
    pub fn detect() -> Result<Self> {
        let systemctl = which::which("systemctl")
            .context("systemctl not found on PATH; is this a systemd host?")?;
        Ok(Self { systemctl })
    }

    pub fn with_systemctl(systemctl: impl Into<PathBuf>) -> Self {
        Self {
            systemctl: systemctl.into(),
        }
    }
}

impl Default for Systemd {
    fn default() -> Self {
        Self::with_systemctl("systemctl")
    }
}

impl InitSystem for Systemd {
    fn name(&self) -> &str {
        "systemd"
    }

    fn reload(&self) -> Result<()> {
        cmd::run(&self.systemctl, ["daemon-reload"])
    }

    fn enable_now(&self, service: &str) -> Result<()> {
        cmd::run(&self.systemctl, ["enable", "--now", service])
            .with_context(|| format!("Failed to enable and start {}", service))
    }

    fn is_active(&self, service: &str) -> bool {
        cmd::probe(&self.systemctl, ["is-active", "--quiet", service])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_systemd() {
        assert_eq!(Systemd::default().name(), "systemd");
    }

    #[test]
    fn missing_systemctl_fails_enable() {
        let init = Systemd::with_systemctl("/nonexistent/systemctl");
        assert!(init.reload().is_err());
        assert!(init.enable_now("demo").is_err());
        assert!(!init.is_active("demo"));
    }
}
