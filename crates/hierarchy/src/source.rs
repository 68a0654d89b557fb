use crate::descriptor::{
    ClassDescriptor, FieldDescriptor, MethodDescriptor, Origin, ParameterDescriptor, TypeKind,
};
use crate::error::{ChainError, Result};
use javatools::{ParsedClass, SourceParser};
use std::path::Path;

/// 源码类解析器 - 编译单元文本 -> ClassDescriptor (不解析父类)
pub struct SourceClassResolver<P> {
    parser: P,
}

impl<P: SourceParser> SourceClassResolver<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    pub async fn resolve(&self, source: &str, file_path: Option<&Path>) -> Result<ClassDescriptor> {
        let parsed = self
            .parser
            .parse(source)
            .await
            .map_err(|e| ChainError::ParseFailure(e.to_string()))?;

        match parsed {
            Some(class) => {
                let mut descriptor = from_parsed(class);
                descriptor.file_path = file_path.map(Path::to_path_buf);
                Ok(descriptor)
            }
            None => Err(ChainError::ParseFailure(match file_path {
                Some(p) => format!("no top-level type declaration in {}", p.display()),
                None => "no top-level type declaration".to_string(),
            })),
        }
    }
}

fn from_parsed(class: ParsedClass) -> ClassDescriptor {
    ClassDescriptor {
        name: class.name,
        package: class.package.filter(|p| !p.is_empty()),
        kind: TypeKind::from_keyword(&class.kind),
        modifiers: class.modifiers,
        annotations: class.annotations,
        fields: class
            .fields
            .into_iter()
            .map(|f| FieldDescriptor {
                name: f.name,
                type_name: f.type_name,
                modifiers: f.modifiers,
            })
            .collect(),
        methods: class
            .methods
            .into_iter()
            .map(|m| MethodDescriptor {
                name: m.name,
                return_type: m.return_type,
                modifiers: m.modifiers,
                parameters: m
                    .parameters
                    .into_iter()
                    .map(|p| ParameterDescriptor {
                        name: p.name,
                        type_name: p.type_name,
                    })
                    .collect(),
            })
            .collect(),
        extends: class.extends.filter(|e| !e.trim().is_empty()),
        implements: class.implements,
        file_path: None,
        origin: Origin::Source,
        library: false,
        parent: None,
    }
}
