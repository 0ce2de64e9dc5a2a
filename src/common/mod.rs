pub mod frame;
pub mod label;

pub use frame::{Frame, Snapshot};
pub use label::Label;
