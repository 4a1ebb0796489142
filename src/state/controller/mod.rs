mod app;
mod catalog;
mod operations;

pub(crate) use app::AppController;
