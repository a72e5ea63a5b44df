mod app;
mod console;
mod persistence;

pub use app::run_app;
