pub mod rate_limit;
pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod fhe;
    pub mod health;
    pub mod keys;
}

pub use rate_limit::RateLimiter;
pub use router::{create_router, ApiDoc};
pub use types::AppState;
