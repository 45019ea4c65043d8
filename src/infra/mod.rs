pub mod clock;
pub mod config;
pub mod contract;
pub mod instance;
pub mod rpc;
