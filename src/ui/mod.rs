mod app;
pub use app::*;

mod dashboard;
pub use dashboard::*;

mod logger;
pub use logger::*;
