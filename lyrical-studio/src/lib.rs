pub mod logging;
pub mod studio;

pub use logging::{init_tracing, init_tracing_from_config};
pub use studio::{Studio, StudioEvent};
