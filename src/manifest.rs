//! Dependency manifests (`requirements*.txt`) and dependency-set selection.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Dependencies installed when no wrapper manifest is present
pub const BUILTIN_REQUIREMENTS: &[&str] = &["fastapi", "uvicorn[standard]", "pydantic"];

const OPERATORS: &[&str] = &["===", "==", "!=", "~=", ">=", "<=", ">", "<"];

/// One `name[extras]<op>version` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    /// Comparison operator and version, e.g. `(">=", "0.110")`. Only the first
    /// clause of a comma-separated specifier is split out; the rest stays in
    /// `version` verbatim.
    pub constraint: Option<(String, String)>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequirementError {
    #[error("empty requirement")]
    Empty,

    #[error("invalid package name '{0}'")]
    InvalidName(String),

    #[error("unterminated extras in '{0}'")]
    UnterminatedExtras(String),

    #[error("missing version after operator in '{0}'")]
    MissingVersion(String),
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // Environment markers are passed through to pip untouched.
        let line = line.split(';').next().unwrap_or("").trim();
        if line.is_empty() {
            return Err(RequirementError::Empty);
        }

        let name_end = line
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(line.len());
        let name = &line[..name_end];
        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(RequirementError::InvalidName(line.to_string()));
        }

        let mut rest = line[name_end..].trim_start();
        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let close = after
                .find(']')
                .ok_or_else(|| RequirementError::UnterminatedExtras(line.to_string()))?;
            extras = after[..close]
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect();
            rest = after[close + 1..].trim_start();
        }

        let constraint = if rest.is_empty() {
            None
        } else {
            let op = OPERATORS
                .iter()
                .find(|op| rest.starts_with(*op))
                .ok_or_else(|| RequirementError::InvalidName(line.to_string()))?;
            let version = rest[op.len()..].trim();
            if version.is_empty() {
                return Err(RequirementError::MissingVersion(line.to_string()));
            }
            Some((op.to_string(), version.to_string()))
        };

        Ok(Self {
            name: name.to_string(),
            extras,
            constraint,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some((op, version)) = &self.constraint {
            write!(f, "{}{}", op, version)?;
        }
        Ok(())
    }
}

pub fn builtin() -> Vec<Requirement> {
    BUILTIN_REQUIREMENTS
        .iter()
        .filter_map(|line| line.parse().ok())
        .collect()
}

/// Which dependencies the wrapper gets. The two sources are never merged.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencySet {
    Builtin(Vec<Requirement>),
    Manifest(PathBuf),
}

/// Pick the wrapper manifest if it exists, otherwise the builtin list
pub fn select(wrapper_manifest: &Path) -> DependencySet {
    if wrapper_manifest.is_file() {
        DependencySet::Manifest(wrapper_manifest.to_path_buf())
    } else {
        DependencySet::Builtin(builtin())
    }
}

/// Parse manifest text, skipping comments, pip options and unparseable lines
pub fn parse(content: &str) -> Vec<Requirement> {
    let mut requirements = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = match raw.find(" #") {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('-') {
            tracing::debug!("line {}: passing pip option through: {}", idx + 1, line);
            continue;
        }

        match line.parse::<Requirement>() {
            Ok(req) => requirements.push(req),
            Err(e) => tracing::warn!("line {}: {} (left for pip to judge)", idx + 1, e),
        }
    }

    requirements
}

pub fn read(path: &Path) -> Result<Vec<Requirement>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    Ok(parse(&content))
}
