pub mod query;
pub mod resubmit;
pub mod submit;
mod utils;
