//! 画像の読み込み・切り出し・保存

use crate::error::{CheckError, Result};
use image::{imageops, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// 完全透明を表すアルファ値（RGBA8）
pub const TRANSPARENT_ALPHA: u8 = 0;

pub fn is_transparent(pixel: &Rgba<u8>) -> bool {
    pixel[3] == TRANSPARENT_ALPHA
}

/// 参照画像を読み込んでRGBA8に変換
pub fn load_reference(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(CheckError::FileNotFound(path.display().to_string()));
    }

    let image = image::open(path)
        .map_err(|e| CheckError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    Ok(image.to_rgba8())
}

/// 完全透明の画像を作成
pub fn transparent_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, TRANSPARENT_ALPHA]))
}

/// キャンバスから矩形を切り出す（範囲外は透明）
pub fn crop_region(canvas: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    let mut cropped = transparent_image(width, height);
    let view = imageops::crop_imm(canvas, x, y, width, height);
    imageops::replace(&mut cropped, &view.to_image(), 0, 0);
    cropped
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// PNGとしてメモリ上にエンコード（通知の添付用）
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
