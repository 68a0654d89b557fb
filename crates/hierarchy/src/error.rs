use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    /// 根类源码无法解析, 唯一会返回给调用者的错误
    #[error("Parse failure: {0}")]
    ParseFailure(String),
    /// 所有候选名都无法反汇编
    #[error("Disassembly not found for {name}: {reason}")]
    DisassemblyNotFound { name: String, reason: String },
    #[error("Malformed member line: {0}")]
    MalformedMemberLine(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;
