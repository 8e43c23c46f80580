//! color-check: 不足しているピクセルを色ごとに集計

use super::load_images;
use crate::comparator::{compare, CompareOptions};
use crate::config::{load_palette, load_profiles, ProjectConfig};
use crate::error::Result;
use crate::project::resolve_project;
use crate::report::ColorReport;
use crate::session::Session;
use crate::tiles::TileSource;
use log::{info, warn};
use wplace_check_common::Profiles;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorCheckOutcome {
    NoDifferences,
    Report(ColorReport),
}

pub async fn run<S: TileSource>(session: &Session<S>, project_name: &str) -> Result<ColorCheckOutcome> {
    let paths = session.paths();
    let project = resolve_project(paths, project_name)?;
    info!("不足ピクセル: {}", project.name);

    let config = ProjectConfig::load(&project.path)?;
    let (reference, canvas) = load_images(session, &config).await?;
    let palette = load_palette(paths)?;

    // 全ピクセルを記録できる上限
    let cap = reference.width() as usize * reference.height() as usize;
    let result = compare(&config.anchor, &reference, &canvas, &palette, &CompareOptions::new(cap));

    if result.is_complete() {
        return Ok(ColorCheckOutcome::NoDifferences);
    }

    let profiles = if paths.profiles().exists() {
        load_profiles(paths)?
    } else {
        warn!("プロファイル設定がありません: {}", paths.profiles().display());
        Profiles::default()
    };

    Ok(ColorCheckOutcome::Report(ColorReport::build(&result, &palette, &profiles)))
}
