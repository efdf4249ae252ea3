use crate::traits::UiAssetProvider;
use crate::{Error, Result};
use async_trait::async_trait;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// A UI asset provider that reads files directly from the configured UI root.
#[derive(Debug, Clone)]
pub struct DiskFrontend {
    root: PathBuf,
}

impl DiskFrontend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 把请求路径映射到 UI 根目录下的文件。
    /// 只接受普通路径分量，`..`、绝对路径等一律视为不存在，防止目录穿越。
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let mut resolved = self.root.clone();
        let mut has_component = false;
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    has_component = true;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        has_component.then_some(resolved)
    }
}

#[async_trait]
impl UiAssetProvider for DiskFrontend {
    async fn get_asset(&self, path: &str) -> Result<(Cow<'static, [u8]>, String)> {
        let not_found = || Error::AssetNotFound(path.to_string());
        let asset_path = self.resolve(path).ok_or_else(not_found)?;

        // 目录不算资源
        let metadata = fs::metadata(&asset_path).await.map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        let content = fs::read(&asset_path).await.map_err(|_| not_found())?;

        // Guess the MIME type based on the file extension
        let mime = mime_guess::from_path(&asset_path)
            .first_or_octet_stream()
            .to_string();

        Ok((Cow::Owned(content), mime))
    }
}
