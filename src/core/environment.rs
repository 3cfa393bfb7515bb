use std::path::{Path, PathBuf};

use thiserror::Error;


pub const PROXY_ENV_VAR: &str = "X509_USER_PROXY";
pub const BUILD_BASE_ENV_VAR: &str = "CMSSW_BASE";
pub const BUILD_ARCH_ENV_VAR: &str = "SCRAM_ARCH";

#[derive(Error, Debug)]
pub enum EnvironmentError {
  #[error("Environment variable {0} is not set")]
  MissingVariable(&'static str),
  #[error("Cannot find a valid grid proxy")]
  ProxyNotFound,
}

/// Process environment the tools depend on, captured once at start-up.
#[derive(Debug, Clone, Default)]
pub struct BuildEnvironment {
  pub build_base: Option<PathBuf>,
  pub build_arch: Option<String>,
  pub user_proxy: Option<PathBuf>,
  pub home: Option<PathBuf>,
  pub uid: u32,
}

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl BuildEnvironment {
  pub fn from_env() -> Self {
    Self {
      build_base: non_empty_var(BUILD_BASE_ENV_VAR).map(PathBuf::from),
      build_arch: non_empty_var(BUILD_ARCH_ENV_VAR),
      user_proxy: non_empty_var(PROXY_ENV_VAR).map(PathBuf::from),
      home: dirs::home_dir(),
      uid: nix::unistd::getuid().as_raw(),
    }
  }

  pub fn build_arch(&self) -> Result<&str, EnvironmentError> {
    self
      .build_arch
      .as_deref()
      .ok_or(EnvironmentError::MissingVariable(BUILD_ARCH_ENV_VAR))
  }

  /// Location of an executable installed by the build area: `$CMSSW_BASE/bin/$SCRAM_ARCH/<name>`.
  pub fn build_bin_path(&self, name: &Path) -> Result<PathBuf, EnvironmentError> {
    let base = self
      .build_base
      .as_ref()
      .ok_or(EnvironmentError::MissingVariable(BUILD_BASE_ENV_VAR))?;
    Ok(base.join("bin").join(self.build_arch()?).join(name))
  }

  /// Explicit `X509_USER_PROXY` wins, otherwise the per-user `x509up_u<uid>` file in the home
  /// directory. The result must exist.
  pub fn resolve_grid_proxy(&self) -> Result<PathBuf, EnvironmentError> {
    let proxy = match &self.user_proxy {
      Some(path) => Some(path.clone()),
      None => self
        .home
        .as_ref()
        .map(|home| home.join(format!("x509up_u{}", self.uid)))
        .filter(|candidate| candidate.exists()),
    };
    match proxy {
      Some(path) if path.exists() => Ok(path),
      _ => Err(EnvironmentError::ProxyNotFound),
    }
  }
}
