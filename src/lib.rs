pub mod app;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;
pub mod util;

// Convenience re-exports (keeps call-sites clean)
pub use app::fhe_service::FheService;
pub use domain::client::{ClientConfig, ClientRegistry, FhevmClient, Network};
pub use domain::compute::{ComputationService, Operation, StubComputation};
pub use domain::decryption::{decrypt, decrypt_batch, generate_decrypt_signature, public_decrypt};
pub use domain::encryption::{
    encrypt, encrypt128, encrypt16, encrypt256, encrypt32, encrypt64, encrypt8, encrypt_batch,
    encrypt_bool,
};
pub use domain::types::{
    BitWidth, DecryptOptions, DecryptResult, DecryptedValue, EncryptedHandle, EncryptedValue,
    PlainValue,
};
pub use error::{Error, Result};
pub use infra::instance::{DefaultInstanceFactory, FheInstance, InstanceFactory};
pub use storage::keys::{FileStore, KeyCache, KeyPair, MemoryStore};
