//! Cap calculation, CSV import and multi-user workflows

pub mod calculator;
pub mod import;
pub mod workflows;

pub use calculator::{propose_caps, CapPolicy, ProposedCap, UsageRow};
pub use import::{parse_usage_csv, ImportError};
