pub mod api;
pub mod error;
pub mod wire;

#[cfg(test)]
mod test;

pub use api::offset_fetch::{OffsetFetchRequest, OffsetFetchResponse};
pub use api::produce::{MessageSet, ProduceRequest, ProduceResponse};
pub use api::{ApiKey, ErrorCode, Request, RequiredAcks, Response};
pub use error::Error;
pub use wire::{decode, encode, Wire};

pub type Result<T> = std::result::Result<T, error::Error>;
