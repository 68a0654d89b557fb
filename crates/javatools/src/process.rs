use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Language error: {0}")]
    Language(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// 外部命令的输出
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// 运行外部命令并等待结束, 非零退出码视为失败
pub async fn run_command(
    program: &str,
    args: &[String],
    stdin: Option<&str>,
) -> Result<CommandOutput> {
    tracing::debug!("Running: {} {:?}", program, args);

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let pipe = child.stdin.take();
    let feed = async move {
        let (Some(input), Some(mut pipe)) = (stdin, pipe) else {
            return Ok(());
        };
        // 子进程可能不读 stdin 就退出, 退出码由 wait 的结果判断
        match pipe.write_all(input.as_bytes()).await {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(e),
            // 关闭 stdin, 子进程才能读到 EOF
            _ => Ok(()),
        }
    };

    // 写入和读取同时进行, 否则输出填满管道后双方互相等待
    let (fed, output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;
    fed?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if !output.status.success() {
        return Err(ToolError::CommandFailed {
            command: program.to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_command_missing_program_is_io_error() {
        let result = run_command("umlchain-definitely-not-a-command", &[], None).await;
        assert!(matches!(result, Err(ToolError::Io(_))));
    }

    #[test]
    fn test_command_failed_display() {
        let err = ToolError::CommandFailed {
            command: "javap".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "Error: class not found: Foo".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "javap exited with exit status: 1: Error: class not found: Foo"
        );
    }
}
