pub mod http;
pub mod std_adapters;

pub use http::HttpMasterApi;
pub use std_adapters::StdEnvAdapter;
