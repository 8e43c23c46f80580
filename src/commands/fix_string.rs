//! fix-string: 自動修正ツール向けのペイロードを出力

use super::load_images;
use crate::comparator::{compare, CompareOptions};
use crate::config::{load_palette, load_profiles, ProjectConfig};
use crate::error::{CheckError, Result};
use crate::project::resolve_project;
use crate::session::Session;
use crate::tiles::TileSource;
use log::info;
use std::fmt;
use wplace_check_common::{FixPayload, PaletteCatalog, ScanDirection};

#[derive(Debug, Clone)]
pub struct FixRequest<'a> {
    pub project: &'a str,
    /// 出力する差分ピクセルの上限
    pub pixel_count: usize,
    /// 利用可能な色を絞り込むプロファイル
    pub profile: Option<&'a str>,
    pub direction: ScanDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    NoDifferences,
    /// 差分はあるが、記録対象の色（パレット・プロファイル内）がない
    NoAvailableColors,
    /// `{"colors":[...],"coords":[...]}`
    Payload(String),
}

impl fmt::Display for FixOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixOutcome::NoDifferences => write!(f, "差分はありません"),
            FixOutcome::NoAvailableColors => write!(f, "利用可能な色の差分ピクセルはありません"),
            FixOutcome::Payload(json) => write!(f, "{}", json),
        }
    }
}

pub async fn run<S: TileSource>(session: &Session<S>, request: &FixRequest<'_>) -> Result<FixOutcome> {
    let paths = session.paths();

    let allowed = match request.profile {
        Some(name) => {
            let profiles = load_profiles(paths)?;
            let ids = profiles
                .get(name)
                .cloned()
                .ok_or_else(|| CheckError::ProfileNotFound(name.to_string()))?;
            Some(ids)
        }
        None => None,
    };

    let project = resolve_project(paths, request.project)?;
    info!("処理中: {}", project.name);

    let config = ProjectConfig::load(&project.path)?;
    let (reference, canvas) = load_images(session, &config).await?;

    let palette = if request.pixel_count > 0 {
        load_palette(paths)?
    } else {
        PaletteCatalog::new()
    };

    let options = CompareOptions::new(request.pixel_count)
        .with_allowed_colors(allowed.as_ref())
        .with_direction(request.direction);
    let result = compare(&config.anchor, &reference, &canvas, &palette, &options);

    if result.is_complete() {
        return Ok(FixOutcome::NoDifferences);
    }

    if result.differences.is_empty() {
        return Ok(FixOutcome::NoAvailableColors);
    }

    let payload = FixPayload::from_differences(&result.differences);
    Ok(FixOutcome::Payload(payload.to_json()?))
}
