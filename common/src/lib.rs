//! wplace-check Common Library
//!
//! タイル取得・照合処理とCLIで共有される型（I/Oを含まない）

pub mod error;
pub mod palette;
pub mod result;
pub mod types;

pub use error::{Error, Result};
pub use palette::{ColorList, ColorRecord, PaletteCatalog, PaletteEntry, ProfileRecord, Profiles, Rgb};
pub use result::{format_count, ComparisonResult, Difference, FixPayload};
pub use types::{AnchorConfig, ScanDirection, TileCoordinate};
