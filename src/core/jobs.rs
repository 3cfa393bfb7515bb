mod descriptor;
pub mod query;
pub mod resubmit;
pub mod submit;
mod utils;

#[cfg(test)]
pub(crate) mod tests;

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, warn};
use thiserror::Error;

pub use descriptor::{DESCRIPTOR_NAME, JOB_SCRIPT_LINK};

#[derive(Error, Debug)]
pub enum JobError {
  #[error("Need to set --{0} option")]
  MissingOption(&'static str),
  #[error("Cannot specify --{0} and --{1} at the same time")]
  ConflictingOptions(&'static str, &'static str),
  #[error("--{0} must be a positive integer")]
  InvalidOption(&'static str),
  #[error("Batch script {0} does not exist. Exiting...")]
  BatchScriptNotFound(PathBuf),
  #[error("Job script {0} does not exist. Exiting...")]
  JobScriptNotFound(PathBuf),
  #[error("Uploaded file {0} does not exist. Exiting...")]
  UploadNotFound(PathBuf),
  #[error("You must specify extra uploads.")]
  NoUploads,
  #[error("Environment Error: {0}")]
  EnvironmentError(#[from] crate::core::environment::EnvironmentError),
  #[error("Template Error: {0}")]
  TemplateError(#[from] tinytemplate::error::Error),
  #[error("IO Error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Job Spawn: {0}")]
  SpawnError(String),
}

/// One external program call, expressed as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  /// Working directory of the child.
  pub current_dir: Option<PathBuf>,
  /// File receiving both stdout and stderr, truncated first.
  pub output: Option<PathBuf>,
}

impl Invocation {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      current_dir: None,
      output: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: &Path) -> Self {
    self.current_dir = Some(dir.to_path_buf());
    self
  }

  pub fn output(mut self, path: &Path) -> Self {
    self.output = Some(path.to_path_buf());
    self
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(dir) = &self.current_dir {
      write!(f, "cd {}; ", dir.display())?;
    }
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        write!(f, " '{}'", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    if let Some(output) = &self.output {
      write!(f, " &> {}", output.display())?;
    }
    Ok(())
  }
}

/// Runs external programs and reports their exit code without judging it.
pub trait CommandRunner {
  fn run(&self, invocation: &Invocation) -> Result<Option<i32>, JobError>;
}

/// Blocking execution through `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, invocation: &Invocation) -> Result<Option<i32>, JobError> {
    debug!("Running {}", invocation);
    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args);
    if let Some(dir) = &invocation.current_dir {
      command.current_dir(dir);
    }
    if let Some(output) = &invocation.output {
      let stdout_file = File::create(output)
        .map_err(|e| utils::map_err_adding_description(e, "Failed to create output file"))?;
      let stderr_file = stdout_file.try_clone()?;
      command
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file));
    }

    let status = command.status().map_err(|e| {
      JobError::SpawnError(format!(
        "Failed to spawn '{}': {}",
        invocation.program, e
      ))
    })?;

    if !status.success() {
      warn!("'{}' exited with {}", invocation.program, status);
    }
    Ok(status.code())
  }
}
