//! Environment provisioning as an ordered list of fallible steps.
//!
//! Steps run in order. The first failing [`Policy::Fatal`] step aborts the
//! whole sequence; a failing [`Policy::BestEffort`] step is logged and
//! skipped. There is no retry and nothing is undone.

use anyhow::Result;
use std::cell::RefCell;

use crate::config::LaunchConfig;
use crate::error::BootError;
use crate::manifest::{self, DependencySet};
use crate::pkgmgr::PackageInstaller;
use crate::venv::{self, EnvState, Runtime, VirtualEnv};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fatal,
    BestEffort,
}

pub struct Step<'a> {
    pub name: &'static str,
    pub policy: Policy,
    action: Box<dyn FnOnce() -> Result<()> + 'a>,
}

impl<'a> Step<'a> {
    pub fn fatal(name: &'static str, action: impl FnOnce() -> Result<()> + 'a) -> Self {
        Self {
            name,
            policy: Policy::Fatal,
            action: Box::new(action),
        }
    }

    pub fn best_effort(name: &'static str, action: impl FnOnce() -> Result<()> + 'a) -> Self {
        Self {
            name,
            policy: Policy::BestEffort,
            action: Box::new(action),
        }
    }
}

/// What happened to each step of a finished sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub completed: Vec<&'static str>,
    /// Best-effort steps that failed, with the rendered error
    pub swallowed: Vec<(&'static str, String)>,
    pub env_state: Option<EnvState>,
    pub dependencies: Option<DependencySet>,
}

#[derive(Default)]
pub struct Sequence<'a> {
    steps: Vec<Step<'a>>,
}

impl<'a> Sequence<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step(mut self, step: Step<'a>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn run(self) -> Result<Report> {
        let mut report = Report::default();

        for step in self.steps {
            tracing::debug!("Running step {}", step.name);

            match ((step.action)(), step.policy) {
                (Ok(()), _) => report.completed.push(step.name),
                (Err(e), Policy::BestEffort) => {
                    tracing::warn!("{} failed, continuing: {:#}", step.name, e);
                    report.swallowed.push((step.name, format!("{:#}", e)));
                }
                (Err(source), Policy::Fatal) => {
                    return Err(BootError::StepFailed {
                        step: step.name,
                        source,
                    }
                    .into());
                }
            }
        }

        Ok(report)
    }
}

/// Provision the virtualenv and install dependencies, stopping short of launch.
///
/// `installer` must already target the environment at `config.venv_path()`.
pub fn prepare(
    config: &LaunchConfig,
    runtime: &dyn Runtime,
    installer: &dyn PackageInstaller,
) -> Result<Report> {
    let env = VirtualEnv::new(config.venv_path());
    tracing::info!(
        "Provisioning {} with {} via {}",
        env.root().display(),
        runtime.name(),
        installer.name()
    );

    let env_state = RefCell::new(None);
    let dependencies = RefCell::new(None);

    let sequence = Sequence::new()
        .step(Step::fatal("check-isolation", || runtime.check_isolation()))
        .step(Step::fatal("ensure-env", || {
            *env_state.borrow_mut() = Some(venv::ensure(runtime, &env)?);
            Ok(())
        }))
        .step(Step::best_effort("upgrade-installer", || {
            installer.upgrade_self()
        }))
        .step(Step::fatal("wrapper-deps", || {
            let set = manifest::select(&config.wrapper_manifest());
            install_dependency_set(installer, &set)?;
            *dependencies.borrow_mut() = Some(set);
            Ok(())
        }))
        .step(Step::fatal("project-deps", || {
            let project = config.project_manifest();
            if !project.is_file() {
                tracing::info!("No {} found, skipping", project.display());
                return Ok(());
            }
            installer.install_manifest(&project)
        }));

    let mut report = sequence.run()?;
    report.env_state = env_state.into_inner();
    report.dependencies = dependencies.into_inner();
    Ok(report)
}

fn install_dependency_set(installer: &dyn PackageInstaller, set: &DependencySet) -> Result<()> {
    match set {
        DependencySet::Manifest(path) => {
            match manifest::read(path) {
                Ok(listed) => println!(
                    "Installing {} requirement(s) from {}",
                    listed.len(),
                    path.display()
                ),
                Err(e) => tracing::warn!("Could not list {}: {:#}", path.display(), e),
            }
            installer.install_manifest(path)
        }
        DependencySet::Builtin(requirements) => {
            println!("Installing builtin requirements ({} total)", requirements.len());
            installer.install(requirements)
        }
    }
}
