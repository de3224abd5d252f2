//! Live adapters talking to the network and the local filesystem.

pub mod gallery;
pub mod photos;
pub mod quotable;
