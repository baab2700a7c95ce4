pub mod bootstrap;
pub mod cmd;
pub mod config;
pub mod error;
pub mod init;
pub mod install;
pub mod launch;
pub mod manifest;
pub mod paths;
pub mod pkgmgr;
pub mod unit;
pub mod venv;
