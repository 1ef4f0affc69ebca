mod app;
pub(crate) mod logging;
mod render;

pub(crate) use app::run_app;
