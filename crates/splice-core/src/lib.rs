#![deny(missing_docs)]
#![doc = "Shared building blocks for splice: the error model, the untrusted value wrapper, and deterministic randomness."]

pub mod errors;
pub mod rng;
pub mod untrusted;

pub use errors::{ErrorInfo, SpliceError};
pub use rng::{derive_substream_seed, RngHandle};
pub use untrusted::{CustomHash, Untrusted, INT_HASH_MODULUS, U32_HASH_SALT, U32_HASH_SHIFT};
