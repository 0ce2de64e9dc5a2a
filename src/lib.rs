pub mod app;
pub mod capture;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pose;
pub mod render;
pub mod session;
pub mod store;

pub use crate::app::{App, Page};
pub use crate::config::Configuration;
pub use crate::coordinator::{CoordinatorBuilder, SessionCoordinator};
pub use crate::error::{AppError, SessionError};
pub use crate::session::{SessionController, SessionResult};
