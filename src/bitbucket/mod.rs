mod client;
mod stats;
mod types;

pub use client::BitbucketClient;
pub use stats::{aggregate, TargetStats};
pub use types::{Pipeline, Repository};
