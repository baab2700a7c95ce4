use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::process::{Command, Stdio};

const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn echo<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) {
    let args_str: Vec<_> = args.iter().map(|s| s.as_ref().to_string_lossy()).collect();
    println!(
        "{}> {} {}{}",
        CYAN,
        program.to_string_lossy(),
        args_str.join(" "),
        RESET
    );
}

pub fn run<P, I, S>(program: P, args: I) -> Result<()>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let args: Vec<_> = args.into_iter().collect();

    echo(program, &args);

    let status = Command::new(program)
        .args(&args)
        .status()
        .with_context(|| format!("Failed to run {}", program.to_string_lossy()))?;

    if !status.success() {
        anyhow::bail!(
            "{} failed with exit code {:?}",
            program.to_string_lossy(),
            status.code()
        );
    }

    Ok(())
}

/// Run a command with its output discarded, reporting only whether it succeeded.
///
/// Used for capability probes where a failure is an answer, not an error.
pub fn probe<P, I, S>(program: P, args: I) -> bool
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let status = Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::debug!("Failed to run {}: {}", program.to_string_lossy(), e);
            false
        }
    }
}

pub fn run_output<P, I, S>(program: P, args: I) -> Result<String>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let args: Vec<_> = args.into_iter().collect();

    echo(program, &args);

    let output = Command::new(program)
        .args(&args)
        .output()
        .with_context(|| format!("Failed to run {}", program.to_string_lossy()))?;

    if !output.status.success() {
        anyhow::bail!(
            "{} failed with exit code {:?}",
            program.to_string_lossy(),
            output.status.code()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
