//! wardrobe-store: Persistence and file handling around the wardrobe core.
//!
//! A SQLite catalog for garments and quiz counters, an upload directory for
//! garment photos, and the [`Closet`] facade that ties both to the scoring
//! engine.

pub mod closet;
pub mod db;
pub mod error;
pub mod uploads;

pub use closet::{Closet, GarmentForm};
pub use db::{GarmentStore, UploadedImage};
pub use error::StoreError;
pub use uploads::UploadDir;
