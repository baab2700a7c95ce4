use anyhow::Result;
use std::env;
use tracing_subscriber::EnvFilter;

use apiboot::bootstrap;
use apiboot::config::LaunchConfig;
use apiboot::launch;
use apiboot::pkgmgr::Pip;
use apiboot::venv::{Python, VirtualEnv};

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

    let config = LaunchConfig::from_env()?;
    let runtime = Python::new(&config.python);
    let installer = Pip::new(VirtualEnv::new(config.venv_path()).python());

    let report = bootstrap::prepare(&config, &runtime, &installer)?;
    tracing::debug!("Bootstrap finished: {:?}", report);

    println!(
        "\nStarting {} on {}:{}\n",
        config.app_module, config.host, config.port
    );

    Err(launch::exec(launch::server_command(&config)))
}

fn print_usage() {
    println!(
        r#"apiboot-launch - Provision the virtualenv and exec the OpenAPI wrapper

Usage:
    apiboot-launch

Environment:
    PORT         Bind port (default: 8000)
    HOST         Bind host (default: 0.0.0.0)
    PYTHON_BIN   Interpreter used to create the virtualenv (default: python3)
    VENV_DIR     Virtualenv directory (default: .venv)
    APP_MODULE   ASGI entry point (default: api_wrapper:app)
    LOGLEVEL     Forwarded to the server
    RUST_LOG     Log filter for this launcher

Files (in the working directory):
    requirements-openapi.txt   Replaces the builtin fastapi/uvicorn/pydantic list
    requirements.txt           Project dependencies, installed when present
"#
    );
}
