mod finding;
mod pod;
mod report;
mod severity;

pub use finding::Finding;
pub use pod::{Condition, ContainerStatus, PodRecord, decode_namespace_list, decode_pod_list};
pub use report::{Aggregator, NamespaceSummary, Report, ScanResult};
pub use severity::Severity;
