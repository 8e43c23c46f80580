pub mod check;
pub mod color_check;
pub mod download;
pub mod fix_string;

use crate::config::ProjectConfig;
use crate::error::Result;
use crate::raster;
use crate::session::Session;
use crate::tiles::TileSource;
use image::RgbaImage;

/// 参照画像を読み込み、対応するリモートキャンバスを組み立てる
pub(crate) async fn load_images<S: TileSource>(
    session: &Session<S>,
    config: &ProjectConfig,
) -> Result<(RgbaImage, RgbaImage)> {
    let reference = raster::load_reference(&config.image)?;
    let canvas = session.remote_canvas(&reference, &config.anchor).await?;
    Ok((reference, canvas))
}
