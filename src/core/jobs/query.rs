use std::path::PathBuf;

use log::info;

use crate::core::jobs::{CommandRunner, Invocation, JobError, utils};

/// Idle or held jobs, i.e. everything that is not running.
pub const NOT_RUNNING_CONSTRAINT: &str = "(JobStatus==1 || JobStatus==5)";

/// Options of the job-argument query, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
  pub constraints: Option<String>,
  pub outfile: Option<PathBuf>,
  pub veto_running: bool,
  pub only_running: bool,
}

/// A validated query: the constraint to apply and where to write the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
  pub constraint: Option<String>,
  pub only_running: bool,
  pub outfile: PathBuf,
}

impl QueryOptions {
  pub fn validate(self) -> Result<QueryRequest, JobError> {
    let outfile = self.outfile.ok_or(JobError::MissingOption("outfile"))?;
    if self.only_running && self.veto_running {
      return Err(JobError::ConflictingOptions("veto_running", "only_running"));
    }

    let user_constraint = self.constraints.filter(|c| !c.is_empty());
    let constraint = if self.veto_running {
      Some(match user_constraint {
        Some(c) => format!("{} && ({})", NOT_RUNNING_CONSTRAINT, c),
        None => NOT_RUNNING_CONSTRAINT.to_string(),
      })
    } else {
      user_constraint
    };

    Ok(QueryRequest {
      constraint,
      only_running: self.only_running,
      outfile: utils::absolute_path(&outfile)?,
    })
  }
}

impl QueryRequest {
  pub fn invocation(&self, query_command: &str) -> Invocation {
    let mut invocation = Invocation::new(query_command).args(["-af", "Args"]);
    if let Some(constraint) = &self.constraint {
      invocation = invocation.args(["-constraint", constraint.as_str()]);
    }
    if self.only_running {
      invocation = invocation.arg("-run");
    }
    invocation.output(&self.outfile)
  }
}

/// Writes the arguments of the matching jobs to the output file. The exit code of the query
/// program is returned as-is.
pub fn query_job_args(
  request: &QueryRequest,
  query_command: &str,
  runner: &dyn CommandRunner,
) -> Result<Option<i32>, JobError> {
  let invocation = request.invocation(query_command);
  info!("Querying job arguments into {}", request.outfile.display());
  runner.run(&invocation)
}
