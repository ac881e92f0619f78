pub mod client;

pub use client::ApiClient;
pub use playtime_api;
