mod server;

pub use server::{DEFAULT_LOG_FILTER, ServerConfig};
