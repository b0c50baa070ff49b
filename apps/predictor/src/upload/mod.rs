// Upload workflow: validate a selected resume, submit it once, narrate the wait.

pub mod narrator;
pub mod session;
pub mod validator;

pub use narrator::{NarrationStage, ProgressNarrator};
pub use session::{Phase, SubmissionOutcome, SubmitStatus, UploadSession};
