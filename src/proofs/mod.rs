pub mod matcher;
pub mod repair;
pub mod store;

pub use matcher::{MatchPolicy, ParsedKey};
pub use repair::DiagnosisReport;
pub use store::{LookupResult, MatchVia, ProofStore};
