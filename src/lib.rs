//! wplace-check
//!
//! 参照画像（ピクセルアート）とwplaceのリモートキャンバスを照合する。
//!
//! - tiles: タイル取得・キャッシュ・キャンバス組み立て
//! - comparator: ピクセル照合と差分リスト生成
//! - commands: check / fix-string / color-check / download-image

pub mod cli;
pub mod commands;
pub mod comparator;
pub mod config;
pub mod error;
pub mod notify;
pub mod paths;
pub mod project;
pub mod raster;
pub mod report;
pub mod session;
pub mod tiles;

pub use comparator::{compare, CompareOptions};
pub use error::{CheckError, Result};
pub use session::Session;
