//! Actor-based workload engine
//!
//! Each actor runs as an independent async task communicating via Tokio
//! channels.
//!
//! ## Architecture Overview
//!
//! ```text
//!                   +------------------+
//!                   | Workload (start) |
//!                   +--------+---------+
//!                            | spawns per target
//!          +-----------------+-----------------+
//!          |                 |                 |
//!   +------v------+   +------v------+   +------v------+
//!   | read worker |   | write worker|   |    ...      |
//!   +------+------+   +------+------+   +------+------+
//!          |                 |                 |
//!          +-----------------+-----------------+
//!                            |
//!                 +----------v----------+
//!                 |  mpsc channel (100) |
//!                 +----------+----------+
//!                            |
//!                 +----------v----------+
//!                 |   AggregatorActor   |  sole writer
//!                 +----------+----------+
//!                            |
//!                 +----------v----------+
//!                 |     MetricStore     |
//!                 +---------------------+
//! ```
//!
//! ## Actor Types
//!
//! - **WorkerActor**: Runs one operation against one target every tick
//! - **AggregatorActor**: Drains the shared channel into the metric store
//!
//! ## Stop Signals
//!
//! A run owns a `CancellationToken`; each target gets a child token as its
//! one-shot stop signal. Cancelling never waits for the actors.

pub mod aggregator;
pub mod messages;
pub mod worker;
