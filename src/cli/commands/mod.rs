pub mod http;
pub mod migrate;
pub mod seed;
