/// Directory systemd reads administrator-installed units from
pub const SYSTEMD_UNIT_DIR: &str = "/etc/systemd/system";

/// Directories systemd loads system units from; a unit written anywhere else
/// is only staged
pub const SYSTEMD_SEARCH_PATH: &[&str] = &[
    "/etc/systemd/system",
    "/run/systemd/system",
    "/usr/local/lib/systemd/system",
    "/usr/lib/systemd/system",
    "/lib/systemd/system",
];

/// Default service name for the OpenAPI wrapper
pub const SERVICE_NAME: &str = "pihole-mcp-openapi";

/// Launcher binary the unit's ExecStart points at
pub const LAUNCHER_BIN: &str = "apiboot-launch";

/// Default virtualenv directory, relative to the project directory
pub const VENV_DIR: &str = ".venv";

/// Wrapper dependency manifest; replaces the builtin list when present
pub const WRAPPER_MANIFEST: &str = "requirements-openapi.txt";

/// Project dependency manifest; installed in addition when present
pub const PROJECT_MANIFEST: &str = "requirements.txt";
