mod api;
mod codec;
mod error;
mod file_store;
mod paths;

pub use api::*;
pub use error::*;
pub use file_store::FileMetadataStore;
pub use paths::metadata_path;
