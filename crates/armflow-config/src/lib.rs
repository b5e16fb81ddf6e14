pub mod error;

pub use error::*;

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file directly
pub const CONFIG_PATH_ENV: &str = "ARMFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 4] = [
    "armflow.local.yaml",
    ".armflow.local.yaml",
    "armflow.yaml",
    ".armflow.yaml",
];

/// armflowの設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("armflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// 接続設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 ARMFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: armflow.local.yaml, .armflow.local.yaml, armflow.yaml, .armflow.yaml
/// 3. ./.armflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/armflow/config.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    if let Some(path) = first_existing(&current_dir) {
        return Ok(path);
    }

    // 3. ./.armflow/ ディレクトリで検索
    let project_dir = current_dir.join(".armflow");
    if project_dir.is_dir() {
        if let Some(path) = first_existing(&project_dir) {
            return Ok(path);
        }
    }

    // 4. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("armflow").join("config.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// YAML設定ファイルを読み込む
pub fn load_from<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 設定ファイルを検索して読み込む
pub fn load<T: DeserializeOwned>() -> Result<(T, PathBuf)> {
    let path = find_config_file()?;
    let config = load_from(&path)?;
    Ok((config, path))
}
