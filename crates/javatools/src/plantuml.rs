use crate::config::ToolConfig;
use crate::process::{run_command, Result, ToolError};
use std::fs;
use std::path::{Path, PathBuf};

/// PlantUML 渲染器 (调用外部 plantuml 命令)
#[derive(Debug, Clone)]
pub struct PlantUml {
    program: String,
    format: String,
}

impl PlantUml {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            format: "png".to_string(),
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            program: config.plantuml.clone(),
            format: config.format.clone(),
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    /// 渲染图文本到 `out_dir/<name>.<format>`, 返回生成的文件路径
    pub async fn render(&self, diagram: &str, name: &str, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let out_dir = out_dir.canonicalize()?;

        // 源文件放在临时目录, 只把图片输出到目标目录
        let work = tempfile::tempdir()?;
        let source = work.path().join(format!("{}.puml", name));
        fs::write(&source, diagram)?;

        let args = self.command_args(&source, &out_dir);
        tracing::info!("Rendering {} with {}", name, self.program);
        run_command(&self.program, &args, None).await?;

        let image = out_dir.join(format!("{}.{}", name, self.format));
        if !image.exists() {
            return Err(ToolError::Parse(format!(
                "{} produced no output at {}",
                self.program,
                image.display()
            )));
        }
        Ok(image)
    }

    #[doc(hidden)]
    pub fn command_args(&self, source: &Path, out_dir: &Path) -> Vec<String> {
        vec![
            format!("-t{}", self.format),
            "-o".to_string(),
            out_dir.to_string_lossy().to_string(),
            source.to_string_lossy().to_string(),
        ]
    }
}

impl Default for PlantUml {
    fn default() -> Self {
        Self::new("plantuml")
    }
}
