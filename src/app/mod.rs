pub mod fhe_service;
