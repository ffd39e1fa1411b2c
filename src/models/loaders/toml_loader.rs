//! 批次文件加载器
//!
//! 一个 TOML 文件描述一批待转录的订单号及每单的可选分配缓冲天数。

use crate::models::batch::BatchFile;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载数据并转换为 BatchFile 对象
pub async fn load_toml_to_batch(toml_file_path: &Path) -> Result<BatchFile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut batch: BatchFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 设置文件路径
    batch.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(batch)
}

/// 从文件夹中加载所有 TOML 批次文件
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<BatchFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut batches = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_toml_to_batch(&path).await {
                Ok(batch) => {
                    tracing::info!("成功加载 {} 个订单号", batch.orders.len());
                    batches.push(batch);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_batch_from_toml() {
        let dir = std::env::temp_dir().join("order_auto_register_loader_test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("batch.toml");
        tokio::fs::write(
            &path,
            r#"
name = "uke-35"

[[orders]]
order_nr = "12345"

[[orders]]
order_nr = "12346"
date_buffer_days = 4
"#,
        )
        .await
        .unwrap();

        let batch = load_toml_to_batch(&path).await.unwrap();
        assert_eq!(batch.name, "uke-35");
        assert_eq!(batch.orders.len(), 2);
        assert_eq!(batch.orders[0].order_nr, "12345");
        assert_eq!(batch.orders[0].date_buffer_days, None);
        assert_eq!(batch.orders[1].date_buffer_days, Some(4));
        assert!(batch.file_path.is_some());
    }
}
