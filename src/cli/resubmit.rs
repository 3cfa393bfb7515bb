use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::cli::utils;
use crate::core::Translator;
use crate::core::jobs::resubmit::{self, DEFAULT_RESUBMIT_NCPUS, ResubmitOptions};
use crate::core::jobs::submit::{DEFAULT_JOB_FLAVOR, DEFAULT_REQUIRED_DISK, DEFAULT_REQUIRED_MEMORY};

/// Resubmit every job listed in condor_q Args dumps, each into its own subjob directory.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
  /// condor_q Args output lists
  #[arg(required = true, num_args = 1..)]
  argfiles: Vec<PathBuf>,
  /// Output directory
  #[arg(long)]
  outdir: PathBuf,
  /// Job script to receive the arguments
  #[arg(long)]
  jobscript: PathBuf,
  /// List of uploads
  #[arg(long, required = true)]
  upload: Vec<PathBuf>,
  /// Batch script to run the actual jobs [default: condor_executable.sh]
  #[arg(long)]
  batchscript: Option<PathBuf>,
  /// Required RAM for the job
  #[arg(long = "required_memory", default_value = DEFAULT_REQUIRED_MEMORY)]
  required_memory: String,
  /// Required disk for the job
  #[arg(long = "required_disk", default_value = DEFAULT_REQUIRED_DISK)]
  required_disk: String,
  /// Required number of CPUs for the job
  #[arg(
    long = "required_ncpus",
    default_value_t = DEFAULT_RESUBMIT_NCPUS,
    value_parser = clap::value_parser!(u32).range(1..)
  )]
  required_ncpus: u32,
  /// Time limit for job (tomorrow = 1 day, workday = 8 hours)
  #[arg(long = "job_flavor", default_value = DEFAULT_JOB_FLAVOR)]
  job_flavor: String,
  /// Only set up the subjob directories, do not submit
  #[arg(long = "dry")]
  dry_run: bool,
}

impl Cli {
  fn into_options(self, default_batch_script: &str) -> ResubmitOptions {
    let batchscript = self
      .batchscript
      .unwrap_or_else(|| PathBuf::from(default_batch_script));
    let mut options = ResubmitOptions::new(self.argfiles, self.outdir, self.jobscript, batchscript);
    options.uploads = self.upload;
    options.required_memory = self.required_memory;
    options.required_disk = self.required_disk;
    options.required_ncpus = self.required_ncpus;
    options.job_flavor = self.job_flavor;
    options.dry_run = self.dry_run;
    options
  }
}

fn run(cli: Cli) -> Result<()> {
  let translator = Translator::new().context("Failed to initialize jobtranslator")?;
  let options = cli.into_options(&translator.config().default_batch_script);
  let submit_tool = resubmit::locate_submit_tool();
  info!(
    "Resubmitting from host '{}' through {}",
    translator.hostname(),
    submit_tool
  );

  let summary = translator.resubmit_jobs(&options, &submit_tool)?;
  if summary.failed.is_empty() {
    println!("✅ Issued {} submissions", summary.issued);
  } else {
    println!(
      "Issued {} submissions, {} did not go through: subjobs {:?}",
      summary.issued,
      summary.failed.len(),
      summary.failed
    );
  }
  Ok(())
}

pub fn main() {
  let cli = Cli::parse();
  utils::exit_on_error(run(cli));
}
