//! Service installation: unit file, launcher permissions, systemd registration.
//!
//! Runs strictly in order and stops at the first failure. Nothing is rolled
//! back, so a failed enable leaves the unit file installed but not running.

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::config::InstallConfig;
use crate::init::InitSystem;
use crate::unit::UnitDescriptor;

#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport {
    pub unit_path: PathBuf,
    pub active: bool,
}

pub fn run(config: &InstallConfig, init: &dyn InitSystem) -> Result<InstallReport> {
    println!("\n=== apiboot Install ===\n");

    let unit = UnitDescriptor::for_service(config);
    let unit_path = unit.write(&config.unit_dir)?;
    println!("✓ Wrote {}", unit_path.display());

    mark_executable(&config.launcher)?;
    println!("✓ Marked {} executable", config.launcher.display());

    if !config.register {
        println!(
            "Staged only: {} is outside systemd's unit directories, skipping {}",
            config.unit_dir.display(),
            init.name()
        );
        return Ok(InstallReport {
            unit_path,
            active: false,
        });
    }

    init.reload()
        .with_context(|| format!("{} failed to reload unit files", init.name()))?;
    init.enable_now(&unit.name)?;

    let active = init.is_active(&unit.name);
    if active {
        println!("✓ {} is running", unit.name);
    } else {
        tracing::warn!("{} was enabled but is not reported active yet", unit.name);
    }

    Ok(InstallReport { unit_path, active })
}

/// Add execute permission for user, group and other, keeping other bits
pub fn mark_executable(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)
        .with_context(|| format!("Launch program not found: {}", path.display()))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to make {} executable", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInit {
        calls: Mutex<Vec<String>>,
        fail_enable: bool,
    }

    impl RecordingInit {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl InitSystem for RecordingInit {
        fn name(&self) -> &str {
            "recording"
        }

        fn reload(&self) -> Result<()> {
            self.calls.lock().unwrap().push("reload".into());
            Ok(())
        }

        fn enable_now(&self, service: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("enable {}", service));
            if self.fail_enable {
                anyhow::bail!("enable refused");
            }
            Ok(())
        }

        fn is_active(&self, _service: &str) -> bool {
            !self.fail_enable
        }
    }

    fn config_in(dir: &Path) -> InstallConfig {
        InstallConfig {
            project_dir: dir.to_path_buf(),
            launcher: dir.join("launch"),
            unit_dir: dir.join("units"),
            ..InstallConfig::default()
        }
    }

    #[test]
    fn installs_and_enables() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.launcher, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&config.launcher, fs::Permissions::from_mode(0o644)).unwrap();

        let init = RecordingInit::default();
        let report = run(&config, &init).unwrap();

        assert_eq!(report.unit_path, config.unit_path());
        assert!(report.active);
        assert_eq!(init.calls(), vec!["reload", "enable pihole-mcp-openapi"]);

        let mode = fs::metadata(&config.launcher).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn repeated_install_writes_identical_unit() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.launcher, "#!/bin/sh\n").unwrap();

        let init = RecordingInit::default();
        run(&config, &init).unwrap();
        let first = fs::read(config.unit_path()).unwrap();
        run(&config, &init).unwrap();
        let second = fs::read(config.unit_path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_launcher_still_writes_unit_but_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let init = RecordingInit::default();
        let err = run(&config, &init).unwrap_err();

        assert!(err.to_string().contains("Launch program not found"));
        assert!(config.unit_path().exists());
        assert!(init.calls().is_empty());
    }

    #[test]
    fn staged_install_skips_init_system() {
        let dir = tempfile::tempdir().unwrap();
        let config = InstallConfig {
            register: false,
            ..config_in(dir.path())
        };
        fs::write(&config.launcher, "#!/bin/sh\n").unwrap();

        let init = RecordingInit::default();
        let report = run(&config, &init).unwrap();

        assert!(config.unit_path().exists());
        assert!(!report.active);
        assert!(init.calls().is_empty());
    }

    #[test]
    fn enable_failure_leaves_unit_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.launcher, "#!/bin/sh\n").unwrap();

        let init = RecordingInit {
            fail_enable: true,
            ..RecordingInit::default()
        };
        assert!(run(&config, &init).is_err());
        assert!(config.unit_path().exists());
        assert_eq!(init.calls(), vec!["reload", "enable pihole-mcp-openapi"]);
    }
}
