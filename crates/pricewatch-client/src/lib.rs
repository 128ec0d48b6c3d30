pub mod fetcher;
pub mod parser;

pub use fetcher::{FetchConfig, HttpFetcher};
pub use parser::HtmlPageParser;
