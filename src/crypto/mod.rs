pub mod abi;
pub mod eip712;
