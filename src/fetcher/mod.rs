pub mod client;
pub mod decode;
pub mod errors;
pub mod types;

pub use client::{PageFetcher, build_client, fetch, get_client, parse_web_url};
pub use errors::FetchError;
pub use types::{BodyKind, Charset, PageResponse};
