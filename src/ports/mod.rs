//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the application core and an
//! external system. Implementations live in `src/adapters/`.

pub mod media_library;
pub mod photo_source;
pub mod quote_source;

pub use media_library::{MediaLibrary, Permission};
pub use photo_source::PhotoSource;
pub use quote_source::{Quote, QuoteSource};
