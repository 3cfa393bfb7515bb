use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::cli::utils;
use crate::core::Translator;
use crate::core::jobs::query::QueryOptions;

/// Dump the arguments of queued HTCondor jobs, one job per line, so they can be resubmitted.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
  /// Constraint string to condor_q
  #[arg(long)]
  constraints: Option<String>,
  /// Name of the output file
  #[arg(long)]
  outfile: Option<PathBuf>,
  /// Do not consider running jobs
  #[arg(long = "veto_running")]
  veto_running: bool,
  /// Only consider running jobs
  #[arg(long = "only_running")]
  only_running: bool,
}

impl From<Cli> for QueryOptions {
  fn from(cli: Cli) -> Self {
    QueryOptions {
      constraints: cli.constraints,
      outfile: cli.outfile,
      veto_running: cli.veto_running,
      only_running: cli.only_running,
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let translator = Translator::new().context("Failed to initialize jobtranslator")?;
  let exit_code = translator.query_job_args(cli.into())?;
  info!("condor_q finished with exit code {:?}", exit_code);
  Ok(())
}

pub fn main() {
  let cli = Cli::parse();
  utils::exit_on_error(run(cli));
}
