//! 结构化解析 - 把一个编译单元的源码变成 ParsedClass

use crate::process::{run_command, Result, ToolError};
use crate::types::{ParsedClass, ParsedField, ParsedMethod, ParsedParameter};
use async_trait::async_trait;
use tree_sitter::{Node, Parser};

/// 结构化解析 trait
#[async_trait]
pub trait SourceParser: Send + Sync {
    /// 解析源码, 没有顶层类型声明时返回 None
    async fn parse(&self, source: &str) -> Result<Option<ParsedClass>>;
}

#[async_trait]
impl<T: SourceParser + ?Sized> SourceParser for Box<T> {
    async fn parse(&self, source: &str) -> Result<Option<ParsedClass>> {
        (**self).parse(source).await
    }
}

const DECLARATION_KINDS: &[(&str, &str)] = &[
    ("class_declaration", "class"),
    ("interface_declaration", "interface"),
    ("enum_declaration", "enum"),
    ("record_declaration", "record"),
    ("annotation_type_declaration", "interface"),
];

/// tree-sitter-java 解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterParser;

impl TreeSitterParser {
    pub fn new() -> Self {
        Self
    }

    fn create_parser() -> Result<Parser> {
        let mut parser = Parser::new();
        let language = tree_sitter_java::language();
        parser
            .set_language(&language)
            .map_err(|e| ToolError::Language(e.to_string()))?;
        Ok(parser)
    }

    /// 同步解析, 供 async 接口和测试复用
    pub fn parse_source(&self, source: &str) -> Result<Option<ParsedClass>> {
        let mut parser = Self::create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ToolError::Parse("tree-sitter returned no tree".into()))?;
        let root = tree.root_node();

        let mut package = None;
        let mut declaration = None;

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            if child.kind() == "package_declaration" && package.is_none() {
                package = package_name(child, source);
            } else if declaration.is_none() {
                let kind = DECLARATION_KINDS.iter().find(|(k, _)| *k == child.kind());
                if let Some((_, kind)) = kind {
                    declaration = Some((child, *kind));
                }
            }
        }

        Ok(declaration.map(|(node, kind)| {
            let mut class = extract_declaration(node, kind, source);
            class.package = package;
            class
        }))
    }
}

#[async_trait]
impl SourceParser for TreeSitterParser {
    async fn parse(&self, source: &str) -> Result<Option<ParsedClass>> {
        self.parse_source(source)
    }
}

/// 外部命令解析器: 源码写入 stdin, 从 stdout 读取 JSON
#[derive(Debug, Clone)]
pub struct CommandParser {
    program: String,
    args: Vec<String>,
}

impl CommandParser {
    /// `command` 按空白切分, 第一个是程序名
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }
}

#[async_trait]
impl SourceParser for CommandParser {
    async fn parse(&self, source: &str) -> Result<Option<ParsedClass>> {
        if self.program.is_empty() {
            return Err(ToolError::Parse("empty parser command".into()));
        }
        let output = run_command(&self.program, &self.args, Some(source)).await?;
        if !output.stderr.trim().is_empty() {
            tracing::debug!("{} stderr: {}", self.program, output.stderr.trim());
        }
        let stdout = output.stdout.trim();
        if stdout.is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<Option<ParsedClass>>(stdout)?)
    }
}

fn text(node: Node, source: &str) -> String {
    let raw = node.utf8_text(source.as_bytes()).unwrap_or_default();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn package_name(node: Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let name = node
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
        .map(|c| text(c, source));
    name
}

fn extract_declaration(node: Node, kind: &str, source: &str) -> ParsedClass {
    let (modifiers, annotations) = extract_modifiers(node, source);

    let mut class = ParsedClass {
        name: node
            .child_by_field_name("name")
            .map(|n| text(n, source))
            .unwrap_or_default(),
        kind: kind.to_string(),
        modifiers,
        annotations,
        ..Default::default()
    };

    if let Some(superclass) = node.child_by_field_name("superclass") {
        class.extends = superclass.named_child(0).map(|t| text(t, source));
    }

    let class_name = class.name.clone();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            // 接口的 extends 列表按实现关系处理
            "super_interfaces" | "extends_interfaces" => {
                class.implements.extend(type_list(child, source));
            }
            "class_body" | "interface_body" | "annotation_type_body" => {
                extract_members(child, &class_name, source, &mut class);
            }
            "enum_body" => {
                let mut body_cursor = child.walk();
                for part in child.named_children(&mut body_cursor) {
                    if part.kind() == "enum_body_declarations" {
                        extract_members(part, &class_name, source, &mut class);
                    }
                }
            }
            _ => {}
        }
    }

    class
}

fn type_list(node: Node, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    let mut types = Vec::new();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            let mut inner = child.walk();
            types.extend(child.named_children(&mut inner).map(|t| text(t, source)));
        }
    }
    types
}

/// 提取修饰符和注解
fn extract_modifiers(node: Node, source: &str) -> (Vec<String>, Vec<String>) {
    let mut modifiers = Vec::new();
    let mut annotations = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "modifiers" {
            continue;
        }
        let mut inner = child.walk();
        for m in child.children(&mut inner) {
            match m.kind() {
                "marker_annotation" | "annotation" => annotations.push(text(m, source)),
                _ => {
                    let keyword = text(m, source);
                    if !keyword.is_empty() && !modifiers.contains(&keyword) {
                        modifiers.push(keyword);
                    }
                }
            }
        }
    }

    (modifiers, annotations)
}

fn extract_members(body: Node, class_name: &str, source: &str, class: &mut ParsedClass) {
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        match member.kind() {
            "field_declaration" | "constant_declaration" => {
                let (modifiers, _) = extract_modifiers(member, source);
                let type_name = member
                    .child_by_field_name("type")
                    .map(|t| text(t, source))
                    .unwrap_or_default();

                let mut decl_cursor = member.walk();
                for declarator in member.children_by_field_name("declarator", &mut decl_cursor) {
                    if let Some(name) = declarator.child_by_field_name("name") {
                        class.fields.push(ParsedField {
                            name: text(name, source),
                            type_name: type_name.clone(),
                            modifiers: modifiers.clone(),
                        });
                    }
                }
            }
            "method_declaration" => {
                let (modifiers, _) = extract_modifiers(member, source);
                class.methods.push(ParsedMethod {
                    name: member
                        .child_by_field_name("name")
                        .map(|n| text(n, source))
                        .unwrap_or_default(),
                    return_type: member
                        .child_by_field_name("type")
                        .map(|t| text(t, source))
                        .unwrap_or_default(),
                    parameters: extract_parameters(member, source),
                    modifiers,
                });
            }
            "constructor_declaration" => {
                let (modifiers, _) = extract_modifiers(member, source);
                class.methods.push(ParsedMethod {
                    name: member
                        .child_by_field_name("name")
                        .map(|n| text(n, source))
                        .unwrap_or_else(|| class_name.to_string()),
                    return_type: String::new(),
                    parameters: extract_parameters(member, source),
                    modifiers,
                });
            }
            _ => {}
        }
    }
}

fn extract_parameters(method: Node, source: &str) -> Vec<ParsedParameter> {
    let Some(params) = method.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut result = Vec::new();
    let mut cursor = params.walk();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "formal_parameter" => result.push(ParsedParameter {
                name: param
                    .child_by_field_name("name")
                    .map(|n| text(n, source))
                    .unwrap_or_default(),
                type_name: param
                    .child_by_field_name("type")
                    .map(|t| text(t, source))
                    .unwrap_or_default(),
            }),
            "spread_parameter" => {
                let mut inner = param.walk();
                let mut type_name = String::new();
                let mut name = String::new();
                for part in param.named_children(&mut inner) {
                    match part.kind() {
                        "modifiers" => {}
                        "variable_declarator" => {
                            name = part
                                .child_by_field_name("name")
                                .map(|n| text(n, source))
                                .unwrap_or_default();
                        }
                        _ if type_name.is_empty() => type_name = text(part, source),
                        _ => {}
                    }
                }
                result.push(ParsedParameter {
                    name,
                    type_name: format!("{}...", type_name),
                });
            }
            _ => {}
        }
    }
    result
}
