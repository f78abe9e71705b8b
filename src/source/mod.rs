pub mod decrypt;
pub mod detect;
pub mod keys;
pub mod reader;
pub mod store;

pub use decrypt::DecryptingReader;
pub use detect::is_encrypted;
pub use keys::{KeyMaterialProvider, StaticKeyProvider};
pub use reader::ObjectLines;
pub use store::{parse_bucket_name, FsObjectStore};
