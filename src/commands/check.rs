//! check: projects/ 配下の作品がキャンバス上で崩れていないか確認

use super::load_images;
use crate::comparator::{compare, CompareOptions};
use crate::config::{ProjectConfig, PushoverConfig};
use crate::error::Result;
use crate::notify::Pushover;
use crate::paths::Paths;
use crate::project::{scan_projects, ProjectInfo};
use crate::raster::crop_region;
use crate::report::match_summary;
use crate::session::Session;
use crate::tiles::TileSource;
use log::{error, info, warn};
use wplace_check_common::{ComparisonResult, PaletteCatalog};

/// プロジェクトごとの判定
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectStatus {
    Disabled,
    Complete,
    Incomplete(ComparisonResult),
}

#[derive(Debug, Default)]
pub struct CheckSummary {
    pub checked: Vec<(String, ProjectStatus)>,
    pub failed: Vec<String>,
}

impl CheckSummary {
    pub fn status(&self, name: &str) -> Option<&ProjectStatus> {
        self.checked
            .iter()
            .find(|(project, _)| project == name)
            .map(|(_, status)| status)
    }
}

/// 全プロジェクト（または filter で指定したもの）を確認
///
/// 1プロジェクトの失敗はログに出して次へ進む。
pub async fn run<S: TileSource>(session: &Session<S>, filter: &[String], push: bool) -> Result<CheckSummary> {
    let notifier = if push { load_notifier(session.paths()) } else { None };

    let projects = scan_projects(&session.paths().projects_dir(), filter)?;
    let mut summary = CheckSummary::default();

    for project in projects {
        info!("処理中: {}", project.name);

        match check_project(session, &project, notifier.as_ref()).await {
            Ok(status) => summary.checked.push((project.name, status)),
            Err(e) => {
                error!("{}: {}", project.name, e);
                summary.failed.push(project.name);
            }
        }
    }

    Ok(summary)
}

/// 通知は任意なので、設定を読めなければ警告して通知なしで続ける
fn load_notifier(paths: &Paths) -> Option<Pushover> {
    match PushoverConfig::load(paths) {
        Ok(config) => config.map(|config| Pushover::new(&config)),
        Err(e) => {
            warn!("Pushover設定を読み込めないため通知しません: {}", e);
            None
        }
    }
}

async fn check_project<S: TileSource>(
    session: &Session<S>,
    project: &ProjectInfo,
    notifier: Option<&Pushover>,
) -> Result<ProjectStatus> {
    let config = ProjectConfig::load(&project.path)?;

    if config.disable_check {
        info!("チェック無効のプロジェクトです");
        return Ok(ProjectStatus::Disabled);
    }

    let (reference, canvas) = load_images(session, &config).await?;

    // 集計だけなので差分は記録しない（パレット不要）
    let result = compare(
        &config.anchor,
        &reference,
        &canvas,
        &PaletteCatalog::new(),
        &CompareOptions::new(0),
    );

    if result.is_complete() {
        info!("差分はありません");
        return Ok(ProjectStatus::Complete);
    }

    let message = match_summary(&result);
    info!("{}", message);

    if let Some(pushover) = notifier {
        let snapshot = crop_region(
            &canvas,
            config.anchor.offset_x,
            config.anchor.offset_y,
            reference.width(),
            reference.height(),
        );
        let text = format!("Project: {}\n{}", project.name, message);

        if let Err(e) = pushover.send(&text, Some(&snapshot)).await {
            warn!("通知を送信できません: {}", e);
        }
    }

    Ok(ProjectStatus::Incomplete(result))
}
