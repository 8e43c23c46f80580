//! 照合結果のテキスト出力
//!
//! - match_summary: 一致率の1行サマリ
//! - ColorReport: 不足ピクセルを色ごとに集計した表

use std::fmt;
use wplace_check_common::{format_count, ComparisonResult, PaletteCatalog, Profiles, Rgb};

/// 無料色のプロファイル表示名
const FREE_PROFILE: &str = "free";

/// `Matching Pixel: 1.234 of 5.678 (21.73%)`
pub fn match_summary(result: &ComparisonResult) -> String {
    format!(
        "Matching Pixel: {} of {} ({:.2}%)",
        result.matching_pixels_formatted(),
        result.total_pixels_formatted(),
        result.match_percentage()
    )
}

/// 色ごとの集計行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRow {
    pub color_id: u32,
    pub name: String,
    pub rgb: Option<Rgb>,
    pub count: usize,
    /// 無料色なら ["free"]、プレミアム色ならその色を含むプロファイル
    pub profiles: Vec<String>,
}

impl ColorRow {
    fn label(&self) -> String {
        format!("{} (#{})", self.name, self.color_id)
    }
}

/// 不足色レポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorReport {
    pub rows: Vec<ColorRow>,
    pub missing_pixels: u64,
    /// どのプロファイルにも含まれないプレミアム色の数
    pub colors_without_profile: usize,
    /// 端末出力時に色見本をANSIカラーで表示する
    pub colored: bool,
}

impl ColorReport {
    pub fn build(result: &ComparisonResult, palette: &PaletteCatalog, profiles: &Profiles) -> Self {
        let mut colors_without_profile = 0;

        let rows = result
            .color_tally()
            .into_iter()
            .map(|(color_id, count)| {
                let entry = palette.get(color_id);
                let premium = entry.map(|e| e.premium).unwrap_or(false);

                let row_profiles: Vec<String> = if premium {
                    let names: Vec<String> = profiles
                        .profiles_containing(color_id)
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    if names.is_empty() {
                        colors_without_profile += 1;
                    }
                    names
                } else {
                    vec![FREE_PROFILE.to_string()]
                };

                ColorRow {
                    color_id,
                    name: entry.map(|e| e.name.clone()).unwrap_or_else(|| "Unknown".into()),
                    rgb: entry.map(|e| e.rgb),
                    count,
                    profiles: row_profiles,
                }
            })
            .collect();

        Self {
            rows,
            missing_pixels: result.missing_pixels(),
            colors_without_profile,
            colored: false,
        }
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    fn swatch(&self, rgb: Option<Rgb>) -> String {
        match rgb {
            Some(rgb) if self.colored => {
                format!("\x1b[38;2;{};{};{}m█\x1b[0m", rgb.r(), rgb.g(), rgb.b())
            }
            _ => "█".to_string(),
        }
    }
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn pad_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", " ".repeat(width.saturating_sub(len)), text)
}

impl fmt::Display for ColorReport {
    /// ```text
    /// ┌───────────────────┬───────┬──────────┐
    /// │ Color             │ Pixel │ Profiles │
    /// ├───────────────────┼───────┼──────────┤
    /// │ █ Black (#1)      │ 1.024 │ free     │
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let footer = [
            format!("{} different colors", self.rows.len()),
            format_count(self.missing_pixels),
            format!("{} colors without profiles", self.colors_without_profile),
        ];

        let body: Vec<[String; 3]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.label(),
                    format_count(row.count as u64),
                    row.profiles.join(", "),
                ]
            })
            .collect();

        // 色見本 "█ " の2文字分を1列目に足す
        let mut widths = [5usize + 2, 5, 8];
        for cells in body.iter() {
            widths[0] = widths[0].max(cells[0].chars().count() + 2);
            widths[1] = widths[1].max(cells[1].chars().count());
            widths[2] = widths[2].max(cells[2].chars().count());
        }
        widths[0] = widths[0].max(footer[0].chars().count());
        widths[1] = widths[1].max(footer[1].chars().count());
        widths[2] = widths[2].max(footer[2].chars().count());

        let rule = |left: &str, mid: &str, right: &str| {
            format!(
                "{}{}{}{}{}{}{}",
                left,
                "─".repeat(widths[0] + 2),
                mid,
                "─".repeat(widths[1] + 2),
                mid,
                "─".repeat(widths[2] + 2),
                right
            )
        };

        writeln!(f, "{}", rule("┌", "┬", "┐"))?;
        writeln!(
            f,
            "│ {} │ {} │ {} │",
            pad_right("Color", widths[0]),
            pad_right("Pixel", widths[1]),
            pad_right("Profiles", widths[2])
        )?;
        writeln!(f, "{}", rule("├", "┼", "┤"))?;

        for (row, cells) in self.rows.iter().zip(&body) {
            writeln!(
                f,
                "│ {} {} │ {} │ {} │",
                self.swatch(row.rgb),
                pad_right(&cells[0], widths[0] - 2),
                pad_left(&cells[1], widths[1]),
                pad_right(&cells[2], widths[2])
            )?;
        }

        writeln!(f, "{}", rule("├", "┼", "┤"))?;
        writeln!(
            f,
            "│ {} │ {} │ {} │",
            pad_right(&footer[0], widths[0]),
            pad_left(&footer[1], widths[1]),
            pad_right(&footer[2], widths[2])
        )?;
        write!(f, "{}", rule("└", "┴", "┘"))
    }
}
