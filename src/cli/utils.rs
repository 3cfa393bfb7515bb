use std::process;

use log::debug;

/// Reports a fatal error the way the tools always have: message on stderr, exit status 1.
pub fn exit_on_error(result: anyhow::Result<()>) {
  if let Err(e) = result {
    debug!("{:?}", e);
    eprintln!("{:#}", e);
    process::exit(1);
  }
}
