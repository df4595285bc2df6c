//! Provider module - inference client trait and the hosted Replicate client

pub mod data_url;
pub mod replicate;
pub mod traits;

pub use replicate::ReplicateProvider;
pub use traits::{InpaintProvider, InpaintRequest};
