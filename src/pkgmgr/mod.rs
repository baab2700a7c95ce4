mod pip;

pub use pip::Pip;

use anyhow::Result;
use std::path::Path;

use crate::manifest::Requirement;

/// Installs dependencies into an isolated environment
pub trait PackageInstaller: Send + Sync {
    /// Name of the installer (e.g., "pip")
    fn name(&self) -> &str;

    /// Upgrade the installer itself
    fn upgrade_self(&self) -> Result<()>;

    /// Install an explicit list of requirements
    fn install(&self, requirements: &[Requirement]) -> Result<()>;

    /// Install everything listed in a manifest file
    fn install_manifest(&self, manifest: &Path) -> Result<()>;
}
