use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::core::jobs::submit::{DEFAULT_JOB_FLAVOR, DEFAULT_REQUIRED_DISK, DEFAULT_REQUIRED_MEMORY};
use crate::core::jobs::{CommandRunner, Invocation, JobError, utils};

/// Queue every resubmitted job goes to.
pub const RESUBMIT_QUEUE: &str = "vanilla";
pub const DEFAULT_RESUBMIT_NCPUS: u32 = 1;
pub const SUBMIT_TOOL_NAME: &str = "reconfigure-condor-jobs";

#[derive(Debug, Clone)]
pub struct ResubmitOptions {
  pub argfiles: Vec<PathBuf>,
  pub outdir: PathBuf,
  pub jobscript: PathBuf,
  pub uploads: Vec<PathBuf>,
  pub batchscript: PathBuf,
  pub required_memory: String,
  pub required_disk: String,
  pub required_ncpus: u32,
  pub job_flavor: String,
  pub dry_run: bool,
}

impl ResubmitOptions {
  pub fn new(argfiles: Vec<PathBuf>, outdir: PathBuf, jobscript: PathBuf, batchscript: PathBuf) -> Self {
    Self {
      argfiles,
      outdir,
      jobscript,
      uploads: Vec::new(),
      batchscript,
      required_memory: DEFAULT_REQUIRED_MEMORY.into(),
      required_disk: DEFAULT_REQUIRED_DISK.into(),
      required_ncpus: DEFAULT_RESUBMIT_NCPUS,
      job_flavor: DEFAULT_JOB_FLAVOR.into(),
      dry_run: false,
    }
  }

  fn validate(&self) -> Result<(), JobError> {
    if self.argfiles.is_empty() {
      return Err(JobError::MissingOption("argfiles"));
    }
    if self.uploads.is_empty() {
      return Err(JobError::MissingOption("upload"));
    }
    if self.required_ncpus == 0 {
      return Err(JobError::InvalidOption("required_ncpus"));
    }
    Ok(())
  }

  pub fn subjob_dir(&self, index: usize) -> PathBuf {
    self.outdir.join(format!("subjob_{}", index))
  }

  /// Command line of the submission tool for the `index`-th job.
  pub fn subjob_invocation(
    &self,
    submit_tool: &str,
    sites: &str,
    index: usize,
    job_args: &str,
  ) -> Invocation {
    let mut invocation = Invocation::new(submit_tool)
      .arg("--batchqueue")
      .arg(RESUBMIT_QUEUE)
      .arg("--batchscript")
      .arg(self.batchscript.display().to_string())
      .arg("--forceSL6")
      .arg("--jobscript")
      .arg(self.jobscript.display().to_string())
      .arg("--jobargs")
      .arg(job_args);
    for upload in &self.uploads {
      invocation = invocation
        .arg("--upload")
        .arg(upload.display().to_string());
    }
    invocation = invocation
      .arg("--outdir")
      .arg(self.subjob_dir(index).display().to_string())
      .arg("--required_memory")
      .arg(self.required_memory.as_str())
      .arg("--required_ncpus")
      .arg(self.required_ncpus.to_string())
      .arg("--required_disk")
      .arg(self.required_disk.as_str())
      .arg("--job_flavor")
      .arg(self.job_flavor.as_str())
      .arg("--sites")
      .arg(sites);
    if self.dry_run {
      invocation = invocation.arg("--dry");
    }
    invocation
  }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResubmitSummary {
  pub issued: usize,
  /// Indices of subjobs whose submission tool failed or could not be started.
  pub failed: Vec<usize>,
}

/// Reads every argument file in order. Each non-blank line, trimmed, is one job's arguments.
pub fn read_job_args(argfiles: &[PathBuf]) -> Result<Vec<String>, JobError> {
  let mut job_args = Vec::new();
  for argfile in argfiles {
    let file = File::open(argfile).map_err(|e| {
      utils::map_err_adding_description(e, &format!("Cannot read '{}'", argfile.display()))
    })?;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
      let line = line?;
      let args = line.trim();
      if args.is_empty() {
        warn!("Skipping blank line {} of {}", line_no + 1, argfile.display());
        continue;
      }
      job_args.push(args.to_string());
    }
  }
  Ok(job_args)
}

/// Submission tool installed next to the running executable, or the bare name for `PATH` lookup.
pub fn locate_submit_tool() -> String {
  std::env::current_exe()
    .ok()
    .as_deref()
    .and_then(Path::parent)
    .map(|dir| dir.join(SUBMIT_TOOL_NAME))
    .filter(|candidate| candidate.is_file())
    .map(|candidate| candidate.display().to_string())
    .unwrap_or_else(|| SUBMIT_TOOL_NAME.to_string())
}

/// Runs the submission tool once per job line, strictly in file then line order. A failing
/// child does not stop the remaining ones and nothing already submitted is undone.
pub fn resubmit_jobs(
  options: &ResubmitOptions,
  sites: &str,
  submit_tool: &str,
  runner: &dyn CommandRunner,
) -> Result<ResubmitSummary, JobError> {
  options.validate()?;
  let all_job_args = read_job_args(&options.argfiles)?;
  info!("Resubmitting {} jobs into {}", all_job_args.len(), options.outdir.display());

  let mut summary = ResubmitSummary::default();
  for (index, job_args) in all_job_args.iter().enumerate() {
    let invocation = options.subjob_invocation(submit_tool, sites, index, job_args);
    summary.issued += 1;
    match runner.run(&invocation) {
      Ok(Some(0)) => {}
      Ok(code) => {
        warn!("Subjob {} submission exited with {:?}", index, code);
        summary.failed.push(index);
      }
      Err(e) => {
        error!("Subjob {} could not be submitted: {}", index, e);
        summary.failed.push(index);
      }
    }
  }
  Ok(summary)
}
