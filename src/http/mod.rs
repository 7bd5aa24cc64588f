//! HTTP request execution, pacing, and the worker pool.
mod execution;
mod rate;
mod sender;
mod workload;

#[cfg(test)]
pub(crate) mod test_support;

pub use workload::{endpoint_url, parse_base_url};

pub(crate) use rate::{Pacer, pacing_interval};
pub(crate) use sender::{WorkerShared, build_client, spawn_workers};
pub(crate) use workload::build_request_template;

#[cfg(test)]
pub(crate) use execution::execute_attempt;
#[cfg(test)]
pub(crate) use rate::base_spacing;
