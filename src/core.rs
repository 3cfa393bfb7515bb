pub mod environment;
pub mod jobs;
pub mod translator_config;

#[cfg(test)]
mod tests;

use crate::core::environment::BuildEnvironment;
use crate::core::jobs::query::{self, QueryOptions};
use crate::core::jobs::resubmit::{self, ResubmitOptions, ResubmitSummary};
use crate::core::jobs::submit::{self, SubmitOptions, SubmitOutcome};
use crate::core::jobs::{CommandRunner, SystemRunner};
use crate::core::translator_config::TranslatorConfig;

/// Everything the tools read from the machine they run on, resolved once at start-up.
pub struct Translator {
  config: TranslatorConfig,
  env: BuildEnvironment,
  hostname: String,
  runner: Box<dyn CommandRunner>,
}

#[derive(thiserror::Error, Debug)]
pub enum TranslatorError {
  #[error("{0}")]
  JobError(#[from] jobs::JobError),
  #[error("Config Error: {0}")]
  ConfigError(#[from] translator_config::TranslatorConfigError),
}

impl Translator {
  pub fn new() -> Result<Self, TranslatorError> {
    let _ = env_logger::try_init();

    let config = translator_config::get_translator_config()?;
    let hostname = gethostname::gethostname().to_string_lossy().into_owned();
    Ok(Translator {
      config,
      env: BuildEnvironment::from_env(),
      hostname,
      runner: Box::new(SystemRunner),
    })
  }

  pub fn with_parts(
    config: TranslatorConfig,
    env: BuildEnvironment,
    hostname: &str,
    runner: Box<dyn CommandRunner>,
  ) -> Self {
    Translator {
      config,
      env,
      hostname: hostname.to_string(),
      runner,
    }
  }

  pub fn config(&self) -> &TranslatorConfig {
    &self.config
  }

  pub fn hostname(&self) -> &str {
    &self.hostname
  }

  /// Sites used for resubmitted jobs on this host.
  pub fn allowed_sites(&self) -> String {
    self.config.select_profile(&self.hostname).sites_arg()
  }

  pub fn query_job_args(&self, options: QueryOptions) -> Result<Option<i32>, TranslatorError> {
    let request = options.validate()?;
    Ok(query::query_job_args(
      &request,
      &self.config.query_command,
      self.runner.as_ref(),
    )?)
  }

  pub fn submit_job(&self, options: SubmitOptions) -> Result<SubmitOutcome, TranslatorError> {
    let request = options.validate()?;
    Ok(submit::submit_job(
      &request,
      &self.env,
      &self.config,
      &self.hostname,
      self.runner.as_ref(),
    )?)
  }

  pub fn resubmit_jobs(
    &self,
    options: &ResubmitOptions,
    submit_tool: &str,
  ) -> Result<ResubmitSummary, TranslatorError> {
    Ok(resubmit::resubmit_jobs(
      options,
      &self.allowed_sites(),
      submit_tool,
      self.runner.as_ref(),
    )?)
  }
}
