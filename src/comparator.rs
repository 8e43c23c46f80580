//! 参照画像とキャンバスのピクセル照合
//!
//! 参照画像の各ピクセルを (x+offsetX, y+offsetY) のキャンバスピクセルと
//! 比較する。完全透明の参照ピクセルは制約なしとして数えない。
//! 不一致のうち、パレットで色IDが引けて許可リストにも含まれるものだけを
//! 差分として上限件数まで記録する（集計値には不一致としてすべて含まれる）。
//!
//! 走査は外側の軸の1ラインごとに rayon で並列に行い、ライン結果を
//! 走査順に連結してから全体の上限を適用する。結果は逐次走査と同一。

use crate::raster::is_transparent;
use image::RgbaImage;
use rayon::prelude::*;
use std::collections::BTreeSet;
use wplace_check_common::{AnchorConfig, ComparisonResult, Difference, PaletteCatalog, Rgb, ScanDirection};

/// 照合オプション
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareOptions<'a> {
    /// 記録する差分の上限（0なら差分は記録しない）
    pub max_differences: usize,
    /// 記録を許可する色ID（None なら全色）
    pub allowed_color_ids: Option<&'a BTreeSet<u32>>,
    pub scan_direction: ScanDirection,
}

impl<'a> CompareOptions<'a> {
    pub fn new(max_differences: usize) -> Self {
        Self {
            max_differences,
            ..Default::default()
        }
    }

    pub fn with_allowed_colors(mut self, allowed: Option<&'a BTreeSet<u32>>) -> Self {
        self.allowed_color_ids = allowed;
        self
    }

    pub fn with_direction(mut self, direction: ScanDirection) -> Self {
        self.scan_direction = direction;
        self
    }
}

/// 1ライン分の集計
#[derive(Debug, Default)]
struct LineTally {
    total: u64,
    matching: u64,
    differences: Vec<Difference>,
}

struct Scan<'a> {
    anchor: &'a AnchorConfig,
    reference: &'a RgbaImage,
    canvas: &'a RgbaImage,
    palette: &'a PaletteCatalog,
    options: &'a CompareOptions<'a>,
}

impl Scan<'_> {
    /// 外側の軸の長さと内側の軸の長さ
    fn axes(&self) -> (u32, u32) {
        let (width, height) = self.reference.dimensions();
        if self.options.scan_direction.is_column_major() {
            (width, height)
        } else {
            (height, width)
        }
    }

    fn scan_line(&self, outer: u32, inner_len: u32) -> LineTally {
        let mut tally = LineTally::default();
        let column_major = self.options.scan_direction.is_column_major();

        for inner in 0..inner_len {
            let (x, y) = if column_major { (outer, inner) } else { (inner, outer) };
            self.classify(x, y, &mut tally);
        }

        tally
    }

    fn classify(&self, x: u32, y: u32, tally: &mut LineTally) {
        let local = self.reference.get_pixel(x, y);
        if is_transparent(local) {
            return;
        }

        tally.total += 1;

        // u32 を超える位置はキャンバス外として不一致
        let (Some(canvas_x), Some(canvas_y)) = (
            x.checked_add(self.anchor.offset_x),
            y.checked_add(self.anchor.offset_y),
        ) else {
            return;
        };

        if self.canvas.get_pixel_checked(canvas_x, canvas_y) == Some(local) {
            tally.matching += 1;
            return;
        }

        // 以降は全体の上限でも切り詰められるので、ラインごとの上限で打ち切ってよい
        if tally.differences.len() >= self.options.max_differences {
            return;
        }

        let Some(color_id) = self.palette.color_id(Rgb::new(local[0], local[1], local[2])) else {
            return;
        };

        if let Some(allowed) = self.options.allowed_color_ids {
            if !allowed.contains(&color_id) {
                return;
            }
        }

        tally
            .differences
            .push(Difference::new(canvas_x, canvas_y, color_id));
    }
}

/// 参照画像とキャンバスを照合
pub fn compare(
    anchor: &AnchorConfig,
    reference: &RgbaImage,
    canvas: &RgbaImage,
    palette: &PaletteCatalog,
    options: &CompareOptions<'_>,
) -> ComparisonResult {
    let scan = Scan {
        anchor,
        reference,
        canvas,
        palette,
        options,
    };

    let (outer_len, inner_len) = scan.axes();
    let reversed = options.scan_direction.is_reversed();

    let lines: Vec<LineTally> = (0..outer_len)
        .into_par_iter()
        .map(|i| {
            let outer = if reversed { outer_len - 1 - i } else { i };
            scan.scan_line(outer, inner_len)
        })
        .collect();

    let mut total_pixels = 0;
    let mut matching_pixels = 0;
    let mut differences = Vec::new();

    for line in lines {
        total_pixels += line.total;
        matching_pixels += line.matching;

        let room = options.max_differences - differences.len();
        differences.extend(line.differences.into_iter().take(room));
    }

    ComparisonResult::new(total_pixels, matching_pixels, differences)
}
