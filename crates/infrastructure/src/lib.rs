//! Adapters behind the domain ports, plus process telemetry.
//!
//! The `memory` module holds the in-process adapters used by the test
//! suites and by single-node deployments that do not need a durable
//! backend.

pub mod memory;
pub mod telemetry;

pub use memory::{
    InMemoryJobStore, InMemoryQuotaLedger, InMemoryUserDirectory, ProvisionerCall,
    RecordingProvisioner,
};
