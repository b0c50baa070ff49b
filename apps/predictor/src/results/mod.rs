// Results view: score classification and the per-role cards built from it.

pub mod board;
pub mod card;
pub mod classifier;

pub use board::ResultBoard;
pub use card::{ResultCard, Style};
