pub mod client;
pub mod compute;
pub mod decryption;
pub mod encryption;
pub mod types;
