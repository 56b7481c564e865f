//! Sustained read/write load against a fleet of database deployments
//!
//! Targets are registered in a [`registry::TargetRegistry`], a
//! [`workload::Workload`] runs a read and a write worker per target, and a
//! single aggregator collects the timed results into a
//! [`store::MetricStore`]. [`table::build_table`] turns the sparse series into
//! one dense, gap-filled comparison table.

pub mod actors;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod result;
pub mod store;
pub mod table;
pub mod util;
pub mod workload;

pub use error::{WorkloadError, WorkloadResult};
pub use registry::Target;
pub use result::{ResultSet, Value};
pub use workload::Workload;
