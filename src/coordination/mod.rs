//! Per-form export orchestration and the polling loop

pub mod exporter;
pub mod scheduler;

pub use exporter::ExportContext;
pub use scheduler::Scheduler;
