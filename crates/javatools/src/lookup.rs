use crate::process::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Java 源文件扩展名
pub const JAVA_EXTENSION: &str = "java";

/// 同目录源文件查找 trait
pub trait SourceLookup: Send + Sync {
    /// 查找 `<dir>/<simple_name>.java`, 存在时返回路径和内容
    fn find_sibling(&self, dir: &Path, simple_name: &str) -> Result<Option<(PathBuf, String)>>;
}

/// 基于文件系统的查找
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceLookup;

impl SourceLookup for FsSourceLookup {
    fn find_sibling(&self, dir: &Path, simple_name: &str) -> Result<Option<(PathBuf, String)>> {
        if simple_name.is_empty() || simple_name.contains(['/', '\\']) {
            return Ok(None);
        }

        let path = dir.join(format!("{}.{}", simple_name, JAVA_EXTENSION));
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        Ok(Some((path, content)))
    }
}

/// 递归收集 .java 文件 (按路径排序)
pub fn collect_java_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            if !is_skipped_dir(&path) {
                collect_into(&path, files)?;
            }
        } else if path.extension().map(|e| e == JAVA_EXTENSION).unwrap_or(false) {
            files.push(path);
        }
    }

    Ok(())
}

/// 构建输出和隐藏目录
fn is_skipped_dir(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => matches!(name, "target" | "build" | "out") || name.starts_with('.'),
        None => false,
    }
}
