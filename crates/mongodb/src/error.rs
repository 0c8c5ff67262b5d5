use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("Failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("Unexpected inserted id: {0}")]
    UnexpectedId(bson::Bson),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
