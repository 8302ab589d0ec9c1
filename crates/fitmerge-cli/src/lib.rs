//! Library side of the fitmerge command line: settings resolution, the
//! console notifier and logging setup.

pub mod config;
pub mod console;
pub mod logging;
