pub mod client;

pub use client::MlServiceClient;
