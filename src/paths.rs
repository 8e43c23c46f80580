//! ルートディレクトリ配下のパス解決
//!
//! ```text
//! <root>/config/colors.yaml
//! <root>/config/profiles.yaml
//! <root>/config/pushover.yaml
//! <root>/config/settings.yaml
//! <root>/projects/<name>/config.yaml
//! ```

use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "config";
const PROJECTS_DIR: &str = "projects";
const PROJECT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.projects_dir().join(name)
    }

    pub fn project_config(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_CONFIG_FILE)
    }

    pub fn config_file(&self, file_name: &str) -> PathBuf {
        self.root.join(CONFIG_DIR).join(file_name)
    }

    pub fn colors(&self) -> PathBuf {
        self.config_file("colors.yaml")
    }

    pub fn profiles(&self) -> PathBuf {
        self.config_file("profiles.yaml")
    }

    pub fn pushover(&self) -> PathBuf {
        self.config_file("pushover.yaml")
    }

    pub fn settings(&self) -> PathBuf {
        self.config_file("settings.yaml")
    }

    /// ルート直下の出力ファイル
    pub fn output(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}
