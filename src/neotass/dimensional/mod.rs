pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod tabulate;
pub mod transform;

pub use error::{EtlError, Result};
