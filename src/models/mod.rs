mod url;

pub use url::{UrlPayload, UrlRecord, UrlStats};
