//! 照合結果の型定義

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 差分ピクセル（キャンバス上の絶対座標 + 塗るべき色ID）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Difference {
    pub x: u32,
    pub y: u32,
    pub color: u32,
}

impl Difference {
    pub const fn new(x: u32, y: u32, color: u32) -> Self {
        Self { x, y, color }
    }

    /// `x,y` 形式の座標
    pub fn coordinates(&self) -> String {
        format!("{},{}", self.x, self.y)
    }
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// 透明でない参照ピクセル数
    pub total_pixels: u64,
    /// そのうち完全一致したピクセル数
    pub matching_pixels: u64,
    /// 差分（上限件数まで、走査順）
    pub differences: Vec<Difference>,
}

impl ComparisonResult {
    pub fn new(total_pixels: u64, matching_pixels: u64, differences: Vec<Difference>) -> Self {
        Self {
            total_pixels,
            matching_pixels,
            differences,
        }
    }

    /// 一致率（%）。対象ピクセルがなければ100.0
    pub fn match_percentage(&self) -> f64 {
        if self.total_pixels > 0 {
            self.matching_pixels as f64 / self.total_pixels as f64 * 100.0
        } else {
            100.0
        }
    }

    pub fn missing_pixels(&self) -> u64 {
        self.total_pixels.saturating_sub(self.matching_pixels)
    }

    pub fn is_complete(&self) -> bool {
        self.matching_pixels == self.total_pixels
    }

    pub fn total_pixels_formatted(&self) -> String {
        format_count(self.total_pixels)
    }

    pub fn matching_pixels_formatted(&self) -> String {
        format_count(self.matching_pixels)
    }

    pub fn missing_pixels_formatted(&self) -> String {
        format_count(self.missing_pixels())
    }

    /// 差分を色IDごとに集計（件数降順、同数はID昇順）
    pub fn color_tally(&self) -> Vec<(u32, usize)> {
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for diff in &self.differences {
            *counts.entry(diff.color).or_insert(0) += 1;
        }

        let mut tally: Vec<(u32, usize)> = counts.into_iter().collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        tally
    }
}

/// 自動化ツール向けの修正ペイロード
///
/// `coords` は `x, y` を交互に並べたフラットな配列。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixPayload {
    pub colors: Vec<u32>,
    pub coords: Vec<u32>,
}

impl FixPayload {
    pub fn from_differences(differences: &[Difference]) -> Self {
        let mut payload = Self {
            colors: Vec::with_capacity(differences.len()),
            coords: Vec::with_capacity(differences.len() * 2),
        };

        for diff in differences {
            payload.colors.push(diff.color);
            payload.coords.push(diff.x);
            payload.coords.push(diff.y);
        }

        payload
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// 3桁ごとに `.` で区切る（例: 1234567 → "1.234.567"）
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
