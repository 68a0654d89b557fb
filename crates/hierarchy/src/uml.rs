use crate::descriptor::{
    erase_generics, is_runtime_name, ClassDescriptor, FieldDescriptor, MethodDescriptor, TypeKind,
};
use std::collections::HashSet;

/// 库类的类体标记
pub const LIBRARY_MARKER: &str = ".. system library ..";

/// 运行时类占位的构造型
pub const RUNTIME_STEREOTYPE: &str = "<<runtime>>";

/// PlantUML 类图生成器
#[derive(Debug, Default, Clone, Copy)]
pub struct DiagramRenderer;

impl DiagramRenderer {
    pub fn new() -> Self {
        Self
    }

    /// 生成类图文本, 每次调用使用新的已输出集合
    pub fn render(&self, root: &ClassDescriptor) -> String {
        let mut emitted = HashSet::new();
        let mut lines = vec!["@startuml".to_string()];

        self.render_definitions(root, &mut emitted, &mut lines);
        self.render_relationships(root, &mut lines);

        lines.push("@enduml".to_string());
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    fn render_definitions(
        &self,
        root: &ClassDescriptor,
        emitted: &mut HashSet<String>,
        lines: &mut Vec<String>,
    ) {
        for descriptor in root.chain() {
            let name = descriptor.diagram_name();
            if emitted.insert(name.clone()) {
                lines.extend(Self::class_block(descriptor, &name));
            }

            // 未解析的父类输出空占位
            if descriptor.has_unresolved_parent() {
                if let Some(parent) = descriptor.extends.as_deref() {
                    let parent = erase_generics(parent).to_string();
                    if emitted.insert(parent.clone()) {
                        lines.extend(Self::placeholder_block(&parent));
                    }
                }
            }
        }

        for descriptor in root.chain() {
            for interface in &descriptor.implements {
                let interface = erase_generics(interface).to_string();
                if emitted.insert(interface.clone()) {
                    lines.push(format!("interface {} {{", interface));
                    lines.push("}".to_string());
                }
            }
        }
    }

    fn render_relationships(&self, root: &ClassDescriptor, lines: &mut Vec<String>) {
        let mut edges = HashSet::new();

        for descriptor in root.chain() {
            let child = descriptor.diagram_name();

            if let Some(extends) = descriptor.extends.as_deref() {
                let (parent, dashed) = match descriptor.parent.as_deref() {
                    Some(p) => (p.diagram_name(), p.library),
                    None => {
                        let name = erase_generics(extends).to_string();
                        let dashed = is_runtime_name(&name);
                        (name, dashed)
                    }
                };
                let arrow = if dashed { "<|.." } else { "<|--" };
                let edge = format!("{} {} {}", parent, arrow, child);
                if edges.insert(edge.clone()) {
                    lines.push(edge);
                }
            }

            for interface in &descriptor.implements {
                let edge = format!("{} <|.. {}", erase_generics(interface), child);
                if edges.insert(edge.clone()) {
                    lines.push(edge);
                }
            }
        }
    }

    fn class_block(descriptor: &ClassDescriptor, name: &str) -> Vec<String> {
        let keyword = match descriptor.kind {
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Class | TypeKind::Record if descriptor.is_abstract() => "abstract class",
            TypeKind::Class | TypeKind::Record => "class",
        };

        let mut header = format!("{} {}", keyword, name);
        if !descriptor.library {
            for annotation in &descriptor.annotations {
                header.push_str(&format!(" <<{}>>", annotation));
            }
        }
        header.push_str(" {");

        let mut block = vec![header];
        if descriptor.library {
            block.push(format!("  {}", LIBRARY_MARKER));
        } else {
            block.extend(descriptor.fields.iter().map(Self::field_line));
            block.extend(descriptor.methods.iter().map(Self::method_line));
        }
        block.push("}".to_string());
        block
    }

    fn placeholder_block(name: &str) -> Vec<String> {
        let header = if is_runtime_name(name) {
            format!("class {} {} {{", name, RUNTIME_STEREOTYPE)
        } else {
            format!("class {} {{", name)
        };
        vec![header, "}".to_string()]
    }

    #[doc(hidden)]
    pub fn field_line(field: &FieldDescriptor) -> String {
        let mut line = format!("  {} ", field.visibility().symbol());
        if field.modifiers.iter().any(|m| m == "static") {
            line.push_str("{static} ");
        }
        line.push_str(&format!("{} : {}", field.name, field.type_name));
        line
    }

    #[doc(hidden)]
    pub fn method_line(method: &MethodDescriptor) -> String {
        let mut line = format!("  {} ", method.visibility().symbol());
        if method.modifiers.iter().any(|m| m == "abstract") {
            line.push_str("{abstract} ");
        } else if method.modifiers.iter().any(|m| m == "static") {
            line.push_str("{static} ");
        }

        let params: Vec<String> = method
            .parameters
            .iter()
            .map(|p| {
                if p.name.is_empty() {
                    p.type_name.clone()
                } else {
                    format!("{} {}", p.type_name, p.name)
                }
            })
            .collect();
        line.push_str(&format!("{}({})", method.name, params.join(", ")));

        if !method.is_constructor() {
            line.push_str(&format!(" : {}", method.return_type));
        }
        line
    }
}
