use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cmd;
use crate::error::BootError;

/// Language runtime able to create isolated dependency environments
pub trait Runtime: Send + Sync {
    /// Interpreter name as configured (e.g., "python3")
    fn name(&self) -> &str;

    /// Fail with [`BootError::MissingCapability`] if environments can't be created
    fn check_isolation(&self) -> Result<()>;

    /// Create a fresh environment at `dir`
    fn create_env(&self, dir: &Path) -> Result<()>;
}

/// CPython with the stdlib `venv` module
#[derive(Debug, Clone)]
pub struct Python {
    interpreter: String,
}

impl Python {
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Runtime for Python {
    fn name(&self) -> &str {
        &self.interpreter
    }

    fn check_isolation(&self) -> Result<()> {
        let missing = |hint: &str| BootError::MissingCapability {
            interpreter: self.interpreter.clone(),
            hint: hint.to_string(),
        };

        let path = which::which(&self.interpreter)
            .map_err(|_| missing("interpreter not found on PATH; install python3"))?;
        tracing::debug!("Using interpreter {}", path.display());

        if !cmd::probe(&path, ["-m", "venv", "--help"]) {
            return Err(missing("install the python3-venv package").into());
        }

        if let Ok(version) = cmd::run_output(&path, ["--version"]) {
            tracing::info!("{} provides venv ({})", self.interpreter, version);
        }

        Ok(())
    }

    fn create_env(&self, dir: &Path) -> Result<()> {
        cmd::run(&self.interpreter, [OsString::from("-m"), "venv".into(), dir.into()])
            .with_context(|| format!("Failed to create virtualenv at {}", dir.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvState {
    Created,
    Reused,
}

/// A virtualenv directory and the paths inside it
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualEnv {
    root: PathBuf,
}

impl VirtualEnv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn python(&self) -> PathBuf {
        self.bin_dir().join("python")
    }

    /// Variables a shell `activate` would set, for the handed-off process
    pub fn activation_env(&self, inherited_path: Option<&str>) -> Vec<(String, OsString)> {
        let mut path = self.bin_dir().into_os_string();
        if let Some(rest) = inherited_path.filter(|p| !p.is_empty()) {
            path.push(":");
            path.push(rest);
        }

        vec![
            ("VIRTUAL_ENV".into(), self.root.clone().into_os_string()),
            ("PATH".into(), path),
        ]
    }
}

/// Create the environment if its directory is missing; otherwise reuse it as-is.
pub fn ensure(runtime: &dyn Runtime, env: &VirtualEnv) -> Result<EnvState> {
    if env.root().is_dir() {
        tracing::info!("Reusing virtualenv at {}", env.root().display());
        return Ok(EnvState::Reused);
    }

    runtime.create_env(env.root())?;
    println!("✓ Created virtualenv at {}", env.root().display());
    Ok(EnvState::Created)
}
