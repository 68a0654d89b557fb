use crate::config::ToolConfig;
use crate::process::{run_command, Result};
use async_trait::async_trait;

/// 反汇编 trait - 全限定类名 -> javap 文本
#[async_trait]
pub trait Disassembler: Send + Sync {
    async fn disassemble(&self, class_name: &str) -> Result<String>;
}

/// javap 反汇编器
#[derive(Debug, Clone)]
pub struct Javap {
    program: String,
    args: Vec<String>,
    classpath: Option<String>,
}

impl Javap {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: vec!["-p".to_string()],
            classpath: None,
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            program: config.javap.clone(),
            args: config.javap_args.clone(),
            classpath: config.classpath.clone(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_classpath(mut self, classpath: Option<String>) -> Self {
        self.classpath = classpath;
        self
    }

    #[doc(hidden)]
    pub fn command_args(&self, class_name: &str) -> Vec<String> {
        let mut args = self.args.clone();
        if let Some(cp) = &self.classpath {
            args.push("-cp".to_string());
            args.push(cp.clone());
        }
        args.push(class_name.to_string());
        args
    }
}

impl Default for Javap {
    fn default() -> Self {
        Self::new("javap")
    }
}

#[async_trait]
impl Disassembler for Javap {
    async fn disassemble(&self, class_name: &str) -> Result<String> {
        let args = self.command_args(class_name);
        let output = run_command(&self.program, &args, None).await?;
        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_default() {
        let javap = Javap::default();
        assert_eq!(javap.command_args("java.lang.String"), vec!["-p", "java.lang.String"]);
    }

    #[test]
    fn test_command_args_with_classpath() {
        let javap = Javap::new("javap")
            .with_args(vec!["-p".into(), "-c".into()])
            .with_classpath(Some("target/classes".into()));
        assert_eq!(
            javap.command_args("com.acme.Widget"),
            vec!["-p", "-c", "-cp", "target/classes", "com.acme.Widget"]
        );
    }

    #[test]
    fn test_from_config() {
        let config = ToolConfig {
            javap: "/usr/lib/jvm/bin/javap".into(),
            ..Default::default()
        };
        let javap = Javap::from_config(&config);
        assert_eq!(javap.program, "/usr/lib/jvm/bin/javap");
        assert_eq!(javap.classpath, None);
    }
}
