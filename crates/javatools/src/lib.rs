//! javatools - 外部工具协作者
//!
//! 源码结构化解析、javap 反汇编、同目录源文件查找、PlantUML 渲染

mod config;
mod javap;
mod lookup;
mod parser;
mod plantuml;
mod process;
mod types;

pub use config::{ToolConfig, DEFAULT_MAX_DEPTH};
pub use javap::{Disassembler, Javap};
pub use lookup::{collect_java_files, FsSourceLookup, SourceLookup, JAVA_EXTENSION};
pub use parser::{CommandParser, SourceParser, TreeSitterParser};
pub use plantuml::PlantUml;
pub use process::{run_command, CommandOutput, Result, ToolError};
pub use types::{ParsedClass, ParsedField, ParsedMethod, ParsedParameter};
