//! Browser lifecycle: launching or attaching to Chrome and handing out views

pub mod config;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use session::BrowserSession;
