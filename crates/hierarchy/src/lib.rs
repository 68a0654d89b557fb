//! hierarchy - 继承链解析与类图生成
//!
//! 合并源码解析和 javap 反汇编两种来源, 构建继承链, 输出去重的 PlantUML 文本

mod builder;
mod descriptor;
mod error;
mod source;
mod system;
mod uml;

pub use builder::{candidate_names, InheritanceChainBuilder, Resolved, FALLBACK_NAMESPACES};
pub use descriptor::{
    erase_generics, is_runtime_name, simple_name, Chain, ClassDescriptor, FieldDescriptor,
    MethodDescriptor, Origin, ParameterDescriptor, TypeKind, Visibility, ROOT_TYPE,
};
pub use error::{ChainError, Result};
pub use source::SourceClassResolver;
pub use system::{parse_disassembly, SystemClassResolver};
pub use uml::{DiagramRenderer, LIBRARY_MARKER, RUNTIME_STEREOTYPE};
