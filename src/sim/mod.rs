pub mod build;
pub mod event;
pub mod flow;
pub mod level;
pub mod progress;
pub mod save;
