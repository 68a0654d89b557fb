use serde::Serialize;
use std::path::PathBuf;

/// 运行时库命名空间前缀
pub const RUNTIME_PREFIXES: &[&str] = &["java.", "javax."];

/// 继承链的终点类型
pub const ROOT_TYPE: &str = "java.lang.Object";

/// 是否是运行时库类名 (纯前缀判断)
pub fn is_runtime_name(name: &str) -> bool {
    RUNTIME_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// 去掉泛型参数: `java.util.Map<K, V>` -> `java.util.Map`
pub fn erase_generics(name: &str) -> &str {
    match name.find('<') {
        Some(pos) => name[..pos].trim(),
        None => name.trim(),
    }
}

/// 简单名: `java.lang.Exception` -> `Exception`
pub fn simple_name(name: &str) -> &str {
    let erased = erase_generics(name);
    erased.rsplit('.').next().unwrap_or(erased)
}

/// 类型声明种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Record,
}

impl TypeKind {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "interface" => Self::Interface,
            "enum" => Self::Enum,
            "record" => Self::Record,
            _ => Self::Class,
        }
    }
}

/// 描述符来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// 项目源码
    #[default]
    Source,
    /// javap 反汇编
    Disassembly,
}

/// 可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    Package,
}

impl Visibility {
    pub fn from_modifiers<S: AsRef<str>>(modifiers: &[S]) -> Self {
        for m in modifiers {
            match m.as_ref() {
                "public" => return Self::Public,
                "protected" => return Self::Protected,
                "private" => return Self::Private,
                _ => {}
            }
        }
        Self::Package
    }

    /// PlantUML 可见性符号
    pub fn symbol(self) -> char {
        match self {
            Self::Public => '+',
            Self::Protected => '#',
            Self::Private => '-',
            Self::Package => '~',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub modifiers: Vec<String>,
}

impl FieldDescriptor {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_modifiers(&self.modifiers)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterDescriptor {
    /// javap 文本没有参数名, 此时为空
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// 构造函数为空
    pub return_type: String,
    pub modifiers: Vec<String>,
    pub parameters: Vec<ParameterDescriptor>,
}

impl MethodDescriptor {
    pub fn visibility(&self) -> Visibility {
        Visibility::from_modifiers(&self.modifiers)
    }

    pub fn is_constructor(&self) -> bool {
        self.return_type.is_empty()
    }
}

/// 类描述符
///
/// `parent` 独占持有已解析的父类, 组成单向链表. `extends` 有值而 `parent`
/// 为空表示父类未能解析, 渲染时输出占位.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassDescriptor {
    pub name: String,
    pub package: Option<String>,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub annotations: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub file_path: Option<PathBuf>,
    pub origin: Origin,
    /// 运行时库类, 渲染时不输出成员
    pub library: bool,
    pub parent: Option<Box<ClassDescriptor>>,
}

impl ClassDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.package {
            Some(p) if !p.is_empty() => format!("{}.{}", p, self.name),
            _ => self.name.clone(),
        }
    }

    /// 图中使用的名字: 源码类用简单名, 反汇编类用全限定名
    pub fn diagram_name(&self) -> String {
        match self.origin {
            Origin::Source => self.name.clone(),
            Origin::Disassembly => self.qualified_name(),
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.iter().any(|m| m == "abstract")
    }

    /// 父类已声明但未解析
    pub fn has_unresolved_parent(&self) -> bool {
        self.extends.is_some() && self.parent.is_none()
    }

    /// 从自身到链尾的迭代
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// 链上描述符个数 (至少为 1)
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// 链尾
    pub fn last_ancestor(&self) -> &ClassDescriptor {
        let mut current = self;
        while let Some(parent) = current.parent.as_deref() {
            current = parent;
        }
        current
    }
}

pub struct Chain<'a> {
    next: Option<&'a ClassDescriptor>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ClassDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}
