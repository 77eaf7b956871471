mod app;
mod cli;
mod effects;
mod persistence;
mod render;
mod session;

pub use app::run_app;
pub use cli::Cli;
