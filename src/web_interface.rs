// Web Interface module root
pub mod rate_limit;
pub mod routes;
pub mod types;
pub mod viewer;
pub mod web_server;


// Re-export commonly used items
pub use rate_limit::RateLimiter;
pub use routes::*;
pub use web_server::*;
