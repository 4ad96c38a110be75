use crate::models::BatchInput;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载一个批次
pub async fn load_toml_to_batch_input(toml_file_path: &Path) -> Result<BatchInput> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut input: BatchInput = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    input.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(input)
}

/// 加载文件夹中所有 TOML 文件，按文件名排序
///
/// 单个文件加载失败只记录警告，不影响其他文件
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<BatchInput>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut inputs = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_toml_to_batch_input(&path).await {
            Ok(input) => {
                tracing::info!("成功加载 {} 条文本", input.texts.len());
                inputs.push(input);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(inputs)
}
