mod systemd;

pub use systemd::Systemd;

use anyhow::Result;

/// Trait for the host init system that supervises the installed service
pub trait InitSystem: Send + Sync {
    /// Name of the init system
    fn name(&self) -> &str;

    /// Re-read unit files from disk
    fn reload(&self) -> Result<()>;

    /// Enable a service to start at boot and start it now
    fn enable_now(&self, service: &str) -> Result<()>;

    /// Check if a service is currently running
    fn is_active(&self, service: &str) -> bool {
        let _ = service;
        false
    }
}
