use std::path::PathBuf;

use tempfile::TempDir;

use crate::core::jobs::JobError;
use crate::core::jobs::query::{NOT_RUNNING_CONSTRAINT, QueryOptions, query_job_args};
use crate::core::jobs::tests::RecordingRunner;

fn options(outfile: PathBuf) -> QueryOptions {
  QueryOptions {
    outfile: Some(outfile),
    ..Default::default()
  }
}

#[test]
fn test_missing_outfile_is_rejected() {
  let result = QueryOptions::default().validate();
  assert!(matches!(result, Err(JobError::MissingOption("outfile"))));
}

#[test]
fn test_veto_and_only_running_conflict_before_any_call() {
  let temp_dir = TempDir::new().unwrap();
  let outfile = temp_dir.path().join("args.txt");
  let result = QueryOptions {
    veto_running: true,
    only_running: true,
    ..options(outfile.clone())
  }
  .validate();
  assert!(matches!(result, Err(JobError::ConflictingOptions(_, _))));
  assert!(!outfile.exists());
}

#[test]
fn test_plain_query_has_no_constraint() {
  let temp_dir = TempDir::new().unwrap();
  let outfile = temp_dir.path().join("args.txt");
  let request = options(outfile.clone()).validate().unwrap();
  let invocation = request.invocation("condor_q");
  assert_eq!(invocation.program, "condor_q");
  assert_eq!(invocation.args, vec!["-af", "Args"]);
  assert_eq!(invocation.output, Some(outfile));
}

#[test]
fn test_empty_user_constraint_is_ignored() {
  let temp_dir = TempDir::new().unwrap();
  let request = QueryOptions {
    constraints: Some(String::new()),
    ..options(temp_dir.path().join("args.txt"))
  }
  .validate()
  .unwrap();
  assert_eq!(request.constraint, None);
}

#[test]
fn test_user_constraint_is_passed_through() {
  let temp_dir = TempDir::new().unwrap();
  let request = QueryOptions {
    constraints: Some("Owner == \"alice\"".to_string()),
    ..options(temp_dir.path().join("args.txt"))
  }
  .validate()
  .unwrap();
  assert_eq!(
    request.invocation("condor_q").args,
    vec!["-af", "Args", "-constraint", "Owner == \"alice\""]
  );
}

#[test]
fn test_veto_running_wraps_constraint() {
  let temp_dir = TempDir::new().unwrap();
  let vetoed = QueryOptions {
    veto_running: true,
    ..options(temp_dir.path().join("args.txt"))
  }
  .validate()
  .unwrap();
  assert_eq!(vetoed.constraint.as_deref(), Some(NOT_RUNNING_CONSTRAINT));

  let combined = QueryOptions {
    veto_running: true,
    constraints: Some("ClusterId == 42".to_string()),
    ..options(temp_dir.path().join("args.txt"))
  }
  .validate()
  .unwrap();
  assert_eq!(
    combined.constraint.as_deref(),
    Some("(JobStatus==1 || JobStatus==5) && (ClusterId == 42)")
  );
}

#[test]
fn test_only_running_adds_run_flag() {
  let temp_dir = TempDir::new().unwrap();
  let request = QueryOptions {
    only_running: true,
    constraints: Some("ClusterId == 42".to_string()),
    ..options(temp_dir.path().join("args.txt"))
  }
  .validate()
  .unwrap();
  assert_eq!(
    request.invocation("condor_q").args,
    vec!["-af", "Args", "-constraint", "ClusterId == 42", "-run"]
  );
}

#[test]
fn test_relative_outfile_becomes_absolute() {
  let request = options(PathBuf::from("args.txt")).validate().unwrap();
  assert!(request.outfile.is_absolute());
  assert!(request.outfile.ends_with("args.txt"));
}

#[test]
fn test_query_exit_code_is_not_an_error() {
  let temp_dir = TempDir::new().unwrap();
  let request = options(temp_dir.path().join("args.txt")).validate().unwrap();
  let runner = RecordingRunner {
    exit_codes: vec![(0, 1)],
    ..Default::default()
  };
  let result = query_job_args(&request, "condor_q", &runner);
  assert_eq!(result.unwrap(), Some(1));
  assert_eq!(runner.recorded().len(), 1);
}
