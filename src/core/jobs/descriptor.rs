//! Rendering of the HTCondor submit description (`condor.sub`).

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::core::jobs::{JobError, utils};

pub const DESCRIPTOR_NAME: &str = "condor.sub";

/// Name of the job script link inside the output directory; jobs transfer it under this name.
pub const JOB_SCRIPT_LINK: &str = "jobscript.sh";

static CONDOR_SUB: &str = include_str!(concat!(
  env!("CARGO_MANIFEST_DIR"),
  "/data/templates/condor.sub"
));

/// Every value substituted into the submit description
#[derive(Serialize, Debug, Clone)]
pub struct DescriptorContext {
  pub queue: String,
  pub sites: String,
  pub batch_script: String,
  pub job_args: String,
  pub out_dir: String,
  pub required_memory: String,
  pub required_ncpus: u32,
  pub required_disk: String,
  pub job_flavor: String,
  pub grid_proxy: String,
  pub job_script: String,
  pub uploads: String,
  pub requirements: String,
  pub singularity_image: Option<String>,
  pub project_name: Option<String>,
}

/// Values go in verbatim: the scheduler syntax must not be HTML-escaped.
pub fn render_descriptor(context: &DescriptorContext) -> Result<String, JobError> {
  let mut tt = TinyTemplate::new();
  tt.set_default_formatter(&tinytemplate::format_unescaped);
  tt.add_template("condor", CONDOR_SUB)?;
  Ok(tt.render("condor", context)?)
}

/// Writes the rendered description to `<out_dir>/condor.sub`, replacing any previous one.
pub fn write_descriptor(out_dir: &Path, content: &str) -> Result<PathBuf, JobError> {
  let path = out_dir.join(DESCRIPTOR_NAME);
  info!("Writing submit description to {}", path.display());
  fs::write(&path, content)
    .map_err(|e| utils::map_err_adding_description(e, "Failed to write submit description"))?;
  Ok(path)
}
