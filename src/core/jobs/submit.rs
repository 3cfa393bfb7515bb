use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::core::environment::BuildEnvironment;
use crate::core::jobs::descriptor::{self, DescriptorContext, JOB_SCRIPT_LINK};
use crate::core::jobs::{CommandRunner, Invocation, JobError, utils};
use crate::core::translator_config::TranslatorConfig;

pub const DEFAULT_REQUIRED_MEMORY: &str = "2048M";
pub const DEFAULT_REQUIRED_DISK: &str = "5G";
pub const DEFAULT_JOB_FLAVOR: &str = "tomorrow";
pub const DEFAULT_REQUIRED_NCPUS: u32 = 2;

/// Options of the submission tool, as given on the command line.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
  pub batchqueue: Option<String>,
  pub batchscript: Option<PathBuf>,
  pub sites: Option<String>,
  pub jobscript: Option<PathBuf>,
  pub jobargs: Option<String>,
  pub uploads: Vec<PathBuf>,
  pub outdir: Option<PathBuf>,
  pub required_memory: String,
  pub required_disk: String,
  pub required_ncpus: u32,
  pub job_flavor: String,
  pub force_legacy_os: bool,
  pub dry_run: bool,
}

impl Default for SubmitOptions {
  fn default() -> Self {
    Self {
      batchqueue: None,
      batchscript: None,
      sites: None,
      jobscript: None,
      jobargs: None,
      uploads: Vec::new(),
      outdir: None,
      required_memory: DEFAULT_REQUIRED_MEMORY.into(),
      required_disk: DEFAULT_REQUIRED_DISK.into(),
      required_ncpus: DEFAULT_REQUIRED_NCPUS,
      job_flavor: DEFAULT_JOB_FLAVOR.into(),
      force_legacy_os: false,
      dry_run: false,
    }
  }
}

/// A submission with every required option present. Paths are still as given.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
  pub queue: String,
  pub batch_script: PathBuf,
  pub sites: String,
  pub job_script: PathBuf,
  pub job_args: String,
  pub uploads: Vec<PathBuf>,
  pub out_dir: PathBuf,
  pub required_memory: String,
  pub required_disk: String,
  pub required_ncpus: u32,
  pub job_flavor: String,
  pub force_legacy_os: bool,
  pub dry_run: bool,
}

impl SubmitOptions {
  /// Checks the required options in a fixed order without touching the filesystem.
  pub fn validate(self) -> Result<SubmissionRequest, JobError> {
    let queue = self.batchqueue.ok_or(JobError::MissingOption("batchqueue"))?;
    let batch_script = self
      .batchscript
      .ok_or(JobError::MissingOption("batchscript"))?;
    let out_dir = self.outdir.ok_or(JobError::MissingOption("outdir"))?;
    let sites = self.sites.ok_or(JobError::MissingOption("sites"))?;
    let job_script = self.jobscript.ok_or(JobError::MissingOption("jobscript"))?;
    let job_args = self.jobargs.ok_or(JobError::MissingOption("jobargs"))?;
    if self.required_ncpus == 0 {
      return Err(JobError::InvalidOption("required_ncpus"));
    }

    Ok(SubmissionRequest {
      queue,
      batch_script,
      sites,
      job_script,
      job_args,
      uploads: self.uploads,
      out_dir,
      required_memory: self.required_memory,
      required_disk: self.required_disk,
      required_ncpus: self.required_ncpus,
      job_flavor: self.job_flavor,
      force_legacy_os: self.force_legacy_os,
      dry_run: self.dry_run,
    })
  }
}

/// Filesystem state of a job directory once every input was checked.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedJob {
  pub out_dir: PathBuf,
  pub batch_script: PathBuf,
  pub job_script: PathBuf,
  pub uploads: Vec<PathBuf>,
}

impl PreparedJob {
  pub fn uploads_arg(&self) -> String {
    self
      .uploads
      .iter()
      .map(|p| p.display().to_string())
      .collect::<Vec<_>>()
      .join(",")
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
  /// The submit program ran; its exit code is informational only.
  Submitted {
    descriptor: PathBuf,
    exit_code: Option<i32>,
  },
  DryRun {
    descriptor: PathBuf,
    command: Invocation,
  },
}

fn locate_batch_script(requested: &Path, env: &BuildEnvironment) -> Result<PathBuf, JobError> {
  if requested.is_file() {
    return utils::absolute_path(requested);
  }
  println!("Batch script does not exist in current directory, will search for CMSSW_BASE/bin");
  let candidate = env.build_bin_path(requested)?;
  if candidate.is_file() {
    println!("\t- Found the batch script");
    utils::absolute_path(&candidate)
  } else {
    Err(JobError::BatchScriptNotFound(requested.to_path_buf()))
  }
}

/// Sets up the output directory:
/// - creates it together with its `Logs` subdirectory
/// - resolves the batch script, falling back to the build area
/// - links the job script as `jobscript.sh`
/// - checks that every upload exists
pub fn prepare_job_directory(
  request: &SubmissionRequest,
  env: &BuildEnvironment,
) -> Result<PreparedJob, JobError> {
  fs::create_dir_all(request.out_dir.join("Logs"))
    .map_err(|e| utils::map_err_adding_description(e, "Failed to create output directory"))?;
  let out_dir = utils::absolute_path(&request.out_dir)?;

  let batch_script = locate_batch_script(&request.batch_script, env)?;

  if !request.job_script.is_file() {
    return Err(JobError::JobScriptNotFound(request.job_script.clone()));
  }
  let job_script = utils::absolute_path(&request.job_script)?;
  utils::replace_symlink(&job_script, &out_dir.join(JOB_SCRIPT_LINK))?;

  let mut uploads = Vec::with_capacity(request.uploads.len());
  for upload in &request.uploads {
    if !upload.is_file() {
      return Err(JobError::UploadNotFound(upload.clone()));
    }
    uploads.push(utils::absolute_path(upload)?);
  }
  if uploads.is_empty() {
    return Err(JobError::NoUploads);
  }

  Ok(PreparedJob {
    out_dir,
    batch_script,
    job_script,
    uploads,
  })
}

/// Builds the substitution values for a prepared job on the given host.
pub fn descriptor_context(
  request: &SubmissionRequest,
  job: &PreparedJob,
  env: &BuildEnvironment,
  config: &TranslatorConfig,
  hostname: &str,
) -> Result<DescriptorContext, JobError> {
  let build_arch = if request.force_legacy_os {
    env.build_arch.as_deref()
  } else {
    Some(env.build_arch()?)
  };
  let image = config.image_for_arch(build_arch, request.force_legacy_os);
  let grid_proxy = env.resolve_grid_proxy()?;
  let profile = config.select_profile(hostname);
  info!("Using the '{}' site profile for host '{}'", profile.name, hostname);

  Ok(DescriptorContext {
    queue: request.queue.clone(),
    sites: request.sites.clone(),
    batch_script: job.batch_script.display().to_string(),
    job_args: request.job_args.clone(),
    out_dir: job.out_dir.display().to_string(),
    required_memory: request.required_memory.clone(),
    required_ncpus: request.required_ncpus,
    required_disk: request.required_disk.clone(),
    job_flavor: request.job_flavor.clone(),
    grid_proxy: grid_proxy.display().to_string(),
    job_script: JOB_SCRIPT_LINK.to_string(),
    uploads: job.uploads_arg(),
    requirements: profile.requirements.clone(),
    singularity_image: profile.singularity_image(image),
    project_name: profile.project_name.clone(),
  })
}

/// Prepares the job directory, writes `condor.sub` and hands it to the submit program unless
/// this is a dry run.
pub fn submit_job(
  request: &SubmissionRequest,
  env: &BuildEnvironment,
  config: &TranslatorConfig,
  hostname: &str,
  runner: &dyn CommandRunner,
) -> Result<SubmitOutcome, JobError> {
  let job = prepare_job_directory(request, env)?;
  let context = descriptor_context(request, &job, env, config, hostname)?;
  let content = descriptor::render_descriptor(&context)?;
  let descriptor = descriptor::write_descriptor(&job.out_dir, &content)?;

  let command = Invocation::new(config.submit_command.as_str())
    .arg(descriptor::DESCRIPTOR_NAME)
    .current_dir(&job.out_dir);
  if request.dry_run {
    return Ok(SubmitOutcome::DryRun {
      descriptor,
      command,
    });
  }

  info!("Submitting {}", descriptor.display());
  let exit_code = runner.run(&command)?;
  if exit_code != Some(0) {
    warn!("Submission of {} may have failed", descriptor.display());
  }
  Ok(SubmitOutcome::Submitted {
    descriptor,
    exit_code,
  })
}
