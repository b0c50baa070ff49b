pub mod analysis;
pub mod file;

pub use analysis::{AnalysisResult, RoleMatch};
pub use file::{CandidateFile, FilePicker};
