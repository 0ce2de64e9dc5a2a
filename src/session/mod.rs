pub mod controller;
pub mod result;
pub mod scoring;
pub mod state;

pub use controller::{FrameOutcome, SessionController, SessionRules};
pub use result::{Capture, SessionResult};
pub use scoring::{final_score, time_bonus};
pub use state::{Phase, SessionState};
