pub mod auth;
pub mod keypair;
pub mod signing;

pub use auth::{sign_request, verify_request, AuthError};
pub use keypair::KeyPair;
pub use signing::{sign, verify_signature, SignatureError};
