//! Social network API client, payload models and the SocialApi seam

pub mod client;
pub mod error;
pub mod models;
pub mod traits;

pub use client::VkClient;
pub use error::ApiError;
pub use models::*;
pub use traits::{methods, SocialApi};
