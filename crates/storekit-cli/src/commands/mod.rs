pub mod details;
pub mod format;
pub mod info;
pub mod priority;
pub mod resolve;
pub mod size;
