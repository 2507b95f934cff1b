// Domain models: status page wire format and the in-memory snapshot

mod snapshot;
mod status;

pub use snapshot::{RefreshSummary, Snapshot};
pub use status::{Indicator, PageInfo, ServiceStatus, StatusInfo, StatusPage};
