use crate::core::jobs::query::QueryOptions;
use crate::core::jobs::resubmit::ResubmitOptions;
use crate::core::jobs::submit::SubmitOutcome;
use crate::core::jobs::tests::{RecordingRunner, Workspace, write_file};
use crate::core::translator_config::TranslatorConfig;
use crate::core::{Translator, TranslatorError};

fn translator(ws: &Workspace, hostname: &str, runner: &RecordingRunner) -> Translator {
  Translator::with_parts(
    TranslatorConfig::default(),
    ws.environment(),
    hostname,
    Box::new(runner.clone()),
  )
}

#[test]
fn allowed_sites_follow_hostname() {
  let ws = Workspace::new();
  let runner = RecordingRunner::default();
  let ucsd = translator(&ws, "uaf-7.t2.ucsd.edu", &runner);
  assert!(ucsd.allowed_sites().starts_with("T2_US_UCSD,"));
  let generic = translator(&ws, "lxplus.cern.ch", &runner);
  assert!(generic.allowed_sites().starts_with("T2_CH_CERN,"));
}

#[test]
fn query_uses_configured_program() {
  let ws = Workspace::new();
  let runner = RecordingRunner::default();
  let mut config = TranslatorConfig::default();
  config.query_command = "/opt/condor/bin/condor_q".to_string();
  let translator = Translator::with_parts(config, ws.environment(), "localhost", Box::new(runner.clone()));

  let options = QueryOptions {
    outfile: Some(ws.path().join("args.txt")),
    veto_running: true,
    ..Default::default()
  };
  translator.query_job_args(options).unwrap();
  let calls = runner.recorded();
  assert_eq!(calls.len(), 1);
  assert_eq!(calls[0].program, "/opt/condor/bin/condor_q");
  assert_eq!(calls[0].output, Some(ws.path().join("args.txt")));
}

#[test]
fn conflicting_query_flags_never_run_anything() {
  let ws = Workspace::new();
  let runner = RecordingRunner::default();
  let options = QueryOptions {
    outfile: Some(ws.path().join("args.txt")),
    veto_running: true,
    only_running: true,
    ..Default::default()
  };
  let result = translator(&ws, "localhost", &runner).query_job_args(options);
  assert!(matches!(result, Err(TranslatorError::JobError(_))));
  assert!(runner.recorded().is_empty());
}

#[test]
fn submit_goes_through_translator() {
  let ws = Workspace::new();
  let runner = RecordingRunner::default();
  let outcome = translator(&ws, "uaf-7.t2.ucsd.edu", &runner)
    .submit_job(ws.submit_options())
    .unwrap();
  assert!(matches!(outcome, SubmitOutcome::Submitted { .. }));
  assert_eq!(runner.recorded().len(), 1);
}

#[test]
fn resubmit_passes_host_sites_to_every_job() {
  let ws = Workspace::new();
  let argfile = write_file(ws.path(), "args.txt", "a=1\nb=2\n");
  let runner = RecordingRunner::default();
  let translator = translator(&ws, "uaf-7.t2.ucsd.edu", &runner);
  let mut options = ResubmitOptions::new(
    vec![argfile],
    ws.path().join("resubmit"),
    ws.job_script.clone(),
    ws.batch_script.clone(),
  );
  options.uploads = vec![ws.upload.clone()];

  let summary = translator.resubmit_jobs(&options, "reconfigure-condor-jobs").unwrap();
  assert_eq!(summary.issued, 2);
  let sites = translator.allowed_sites();
  for call in runner.recorded() {
    let pos = call.args.iter().position(|a| a == "--sites").unwrap();
    assert_eq!(call.args[pos + 1], sites);
    assert!(call.args.contains(&"--forceSL6".to_string()));
  }
}
