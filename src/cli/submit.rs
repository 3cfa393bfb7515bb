use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::utils;
use crate::core::Translator;
use crate::core::jobs::submit::{
  DEFAULT_JOB_FLAVOR, DEFAULT_REQUIRED_DISK, DEFAULT_REQUIRED_MEMORY, DEFAULT_REQUIRED_NCPUS,
  SubmitOptions, SubmitOutcome,
};

/// Prepare a job directory with a condor.sub description and submit it to HTCondor.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
  /// Batch queue
  #[arg(long)]
  batchqueue: Option<String>,
  /// Name of the HTCondor script that runs the job script
  #[arg(long)]
  batchscript: Option<PathBuf>,
  /// Name of the HTCondor run sites
  #[arg(long)]
  sites: Option<String>,
  /// Name of the actual job script
  #[arg(long)]
  jobscript: Option<PathBuf>,
  /// Arguments to the job script
  #[arg(long, allow_hyphen_values = true)]
  jobargs: Option<String>,
  /// Uploads to the job (can specify multiple inputs)
  #[arg(long)]
  upload: Vec<PathBuf>,
  /// Name of the output directory
  #[arg(long)]
  outdir: Option<PathBuf>,
  /// Required RAM for the job
  #[arg(long = "required_memory", default_value = DEFAULT_REQUIRED_MEMORY)]
  required_memory: String,
  /// Required disk for the job
  #[arg(long = "required_disk", default_value = DEFAULT_REQUIRED_DISK)]
  required_disk: String,
  /// Required number of CPUs for the job
  #[arg(
    long = "required_ncpus",
    default_value_t = DEFAULT_REQUIRED_NCPUS,
    value_parser = clap::value_parser!(u32).range(1..)
  )]
  required_ncpus: u32,
  /// Time limit for job (tomorrow = 1 day, workday = 8 hours)
  #[arg(long = "job_flavor", default_value = DEFAULT_JOB_FLAVOR)]
  job_flavor: String,
  /// Force running on SL6 architecture
  #[arg(long = "forceSL6")]
  force_sl6: bool,
  /// Do not submit jobs, just set up the files
  #[arg(long = "dry")]
  dry_run: bool,
}

impl From<Cli> for SubmitOptions {
  fn from(cli: Cli) -> Self {
    SubmitOptions {
      batchqueue: cli.batchqueue,
      batchscript: cli.batchscript,
      sites: cli.sites,
      jobscript: cli.jobscript,
      jobargs: cli.jobargs,
      uploads: cli.upload,
      outdir: cli.outdir,
      required_memory: cli.required_memory,
      required_disk: cli.required_disk,
      required_ncpus: cli.required_ncpus,
      job_flavor: cli.job_flavor,
      force_legacy_os: cli.force_sl6,
      dry_run: cli.dry_run,
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let translator = Translator::new().context("Failed to initialize jobtranslator")?;
  match translator.submit_job(cli.into())? {
    SubmitOutcome::DryRun { command, .. } => println!("Job command: '{}'", command),
    SubmitOutcome::Submitted { .. } => {}
  }
  Ok(())
}

pub fn main() {
  let cli = Cli::parse();
  utils::exit_on_error(run(cli));
}
