use super::PackageInstaller;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cmd;
use crate::manifest::Requirement;

/// pip, run as `<venv>/bin/python -m pip` so installs land in the venv
#[derive(Debug, Clone)]
pub struct Pip {
    python: PathBuf,
}

impl Pip {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    fn pip_install<I>(&self, extra: I) -> Result<()>
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut args: Vec<OsString> = vec!["-m".into(), "pip".into(), "install".into()];
        args.extend(extra);
        cmd::run(&self.python, args)
    }
}

impl PackageInstaller for Pip {
    fn name(&self) -> &str {
        "pip"
    }

    fn upgrade_self(&self) -> Result<()> {
        self.pip_install(["--upgrade".into(), "pip".into()])
    }

    fn install(&self, requirements: &[Requirement]) -> Result<()> {
        if requirements.is_empty() {
            return Ok(());
        }

        self.pip_install(requirements.iter().map(|r| OsString::from(r.to_string())))
    }

    fn install_manifest(&self, manifest: &Path) -> Result<()> {
        self.pip_install(["-r".into(), manifest.into()])
            .with_context(|| format!("Failed to install {}", manifest.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_install_is_a_no_op() {
        let pip = Pip::new("/nonexistent/python");
        assert!(pip.install(&[]).is_ok());
    }

    #[test]
    fn missing_interpreter_fails() {
        let pip = Pip::new("/nonexistent/python");
        assert!(pip.upgrade_self().is_err());
        let err = pip
            .install_manifest(Path::new("requirements.txt"))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to install requirements.txt"));
    }
}
