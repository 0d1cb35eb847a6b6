//! In-memory implementations of the domain ports.

mod directory;
mod provisioner;
mod quota;
mod store;

pub use directory::InMemoryUserDirectory;
pub use provisioner::{ProvisionerCall, RecordingProvisioner};
pub use quota::InMemoryQuotaLedger;
pub use store::InMemoryJobStore;
