pub mod config;
pub mod docker;
pub mod download;
pub mod error;
pub mod logs;
pub mod pipeline;
pub mod process;
pub mod release;
pub mod status;
pub mod util;
