//! リモートキャンバスのタイル取得と組み立て
//!
//! - fetcher: HTTPでタイルを1枚取得・デコード
//! - cache: 実行中だけ有効なタイルキャッシュ（ローカル保存）
//! - assembler: 参照画像を覆うタイルを集めて1枚のキャンバスにする

mod assembler;
pub mod cache;
mod fetcher;

pub use assembler::{tile_count, CanvasAssembler, GridCell, TileGrid};
pub use cache::{CacheStats, TileCache};
pub use fetcher::{decode_tile, validate_tile, HttpTileSource};

use crate::error::Result;
use image::RgbaImage;
use wplace_check_common::TileCoordinate;

/// タイルの取得元
#[allow(async_fn_in_trait)]
pub trait TileSource {
    /// 1辺のピクセル数
    fn tile_size(&self) -> u32;

    /// タイルを取得してデコードする
    async fn fetch_tile(&self, coord: TileCoordinate) -> Result<RgbaImage>;
}
