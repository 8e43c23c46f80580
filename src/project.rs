use crate::error::{CheckError, Result};
use crate::paths::Paths;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// projects/ 直下のプロジェクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub path: PathBuf,
}

/// `_` で始まるプロジェクトは無効扱い
fn is_hidden_project(name: &str) -> bool {
    name.starts_with('_')
}

/// projects/ 直下をスキャン
///
/// `filter` が空でなければ、その名前のプロジェクトだけを対象にする。
pub fn scan_projects(projects_dir: &Path, filter: &[String]) -> Result<Vec<ProjectInfo>> {
    if !projects_dir.exists() {
        return Err(CheckError::FolderNotFound(projects_dir.display().to_string()));
    }

    let mut projects = Vec::new();

    for entry in WalkDir::new(projects_dir)
        .min_depth(1)
        .max_depth(1)  // 直下のみ
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let name = entry.file_name().to_string_lossy().to_string();

        if !filter.is_empty() && !filter.iter().any(|f| *f == name) {
            continue;
        }

        if is_hidden_project(&name) || !entry.file_type().is_dir() {
            debug!("スキップ: {}", name);
            continue;
        }

        projects.push(ProjectInfo {
            name,
            path: entry.path().to_path_buf(),
        });
    }

    Ok(projects)
}

/// 名前でプロジェクトを解決
pub fn resolve_project(paths: &Paths, name: &str) -> Result<ProjectInfo> {
    let path = paths.project_dir(name);
    if !path.is_dir() {
        return Err(CheckError::ProjectNotFound(name.to_string()));
    }

    Ok(ProjectInfo {
        name: name.to_string(),
        path,
    })
}
