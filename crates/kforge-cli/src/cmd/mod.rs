pub mod init;
pub mod roadmap;
pub mod stats;
pub mod status;
pub mod task;
