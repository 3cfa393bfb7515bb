use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use crate::core::environment::BuildEnvironment;
use crate::core::jobs::submit::SubmitOptions;
use crate::core::jobs::{CommandRunner, Invocation, JobError};

mod query;

/// Records every invocation instead of running it. Calls listed in `spawn_failures` fail to
/// start, calls listed in `exit_codes` report that code, everything else exits with 0.
#[derive(Default, Clone)]
pub struct RecordingRunner {
  pub calls: Rc<RefCell<Vec<Invocation>>>,
  pub spawn_failures: Vec<usize>,
  pub exit_codes: Vec<(usize, i32)>,
}

impl RecordingRunner {
  pub fn recorded(&self) -> Vec<Invocation> {
    self.calls.borrow().clone()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&self, invocation: &Invocation) -> Result<Option<i32>, JobError> {
    let index = self.calls.borrow().len();
    self.calls.borrow_mut().push(invocation.clone());
    if self.spawn_failures.contains(&index) {
      return Err(JobError::SpawnError(format!("cannot start {}", invocation.program)));
    }
    let code = self
      .exit_codes
      .iter()
      .find(|(i, _)| *i == index)
      .map(|(_, code)| *code)
      .unwrap_or(0);
    Ok(Some(code))
  }
}

/// Scratch area holding the files a submission needs.
pub struct Workspace {
  pub dir: TempDir,
  pub batch_script: PathBuf,
  pub job_script: PathBuf,
  pub upload: PathBuf,
  pub proxy: PathBuf,
}

impl Workspace {
  pub fn new() -> Self {
    let dir = TempDir::new().unwrap();
    let batch_script = write_file(dir.path(), "condor_executable.sh", "#!/bin/bash\n");
    let job_script = write_file(dir.path(), "run_analysis.sh", "#!/bin/bash\necho $@\n");
    let upload = write_file(dir.path(), "inputs.tar", "payload");
    let proxy = write_file(dir.path(), "x509up_u1000", "proxy");
    Workspace {
      dir,
      batch_script,
      job_script,
      upload,
      proxy,
    }
  }

  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  pub fn out_dir(&self) -> PathBuf {
    self.path().join("output")
  }

  pub fn environment(&self) -> BuildEnvironment {
    BuildEnvironment {
      build_base: Some(self.path().join("CMSSW_10_2_22")),
      build_arch: Some("slc7_amd64_gcc700".to_string()),
      user_proxy: Some(self.proxy.clone()),
      home: Some(self.path().to_path_buf()),
      uid: 1000,
    }
  }

  pub fn submit_options(&self) -> SubmitOptions {
    SubmitOptions {
      batchqueue: Some("vanilla".to_string()),
      batchscript: Some(self.batch_script.clone()),
      sites: Some("T2_CH_CERN,T2_US_UCSD".to_string()),
      jobscript: Some(self.job_script.clone()),
      jobargs: Some("sample=DY year=2018".to_string()),
      uploads: vec![self.upload.clone()],
      outdir: Some(self.out_dir()),
      ..Default::default()
    }
  }
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, content).unwrap();
  path
}

#[test]
fn test_invocation_display_quotes_arguments_with_spaces() {
  let invocation = Invocation::new("condor_q")
    .args(["-af", "Args", "-constraint"])
    .arg("(JobStatus==1 || JobStatus==5)")
    .output(Path::new("/tmp/args.txt"));
  assert_eq!(
    invocation.to_string(),
    "condor_q -af Args -constraint '(JobStatus==1 || JobStatus==5)' &> /tmp/args.txt"
  );
}

#[test]
fn test_invocation_display_includes_working_directory() {
  let invocation = Invocation::new("condor_submit")
    .arg("condor.sub")
    .current_dir(Path::new("/work/out"));
  assert_eq!(invocation.to_string(), "cd /work/out; condor_submit condor.sub");
}
