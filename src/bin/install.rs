use anyhow::{bail, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use apiboot::config::InstallConfig;
use apiboot::init::Systemd;
use apiboot::install;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Some(arg) = env::args().nth(1) {
        if matches!(arg.as_str(), "help" | "--help" | "-h") {
            print_usage();
            return Ok(());
        }
        eprintln!("Unexpected argument: {}", arg);
        print_usage();
        std::process::exit(1);
    }

    let config = InstallConfig::from_env()?;

    if config.register && !nix::unistd::Uid::effective().is_root() {
        bail!(
            "apiboot-install must be run as root to write {} (use sudo)",
            config.unit_dir.display()
        );
    }

    let init = if config.register {
        Systemd::detect()?
    } else {
        Systemd::default()
    };
    let report = install::run(&config, &init)?;

    println!("\n=== Install Complete ===\n");
    println!("Unit: {}", report.unit_path.display());
    println!("Logs: journalctl -u {} -f\n", config.service_name);

    Ok(())
}

fn print_usage() {
    println!(
        r#"apiboot-install - Install and start the OpenAPI wrapper as a systemd service

Usage:
    apiboot-install

Environment:
    APIBOOT_SERVICE       Unit name (default: pihole-mcp-openapi)
    APIBOOT_PROJECT_DIR   Working directory for the service (default: current directory)
    APIBOOT_LAUNCHER      Program run by ExecStart (default: apiboot-launch next to this binary)
    APIBOOT_UNIT_DIR      Where the unit file is written (default: /etc/systemd/system).
                          Outside systemd's unit directories the file is only staged:
                          systemctl is not called and root is not required.
    RUST_LOG              Log filter (e.g. debug)
"#
    );
}
