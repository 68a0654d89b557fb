//! 系统类解析 - 从 javap 文本还原类的形状

use crate::descriptor::{
    erase_generics, is_runtime_name, simple_name, ClassDescriptor, FieldDescriptor,
    MethodDescriptor, Origin, ParameterDescriptor,
};
use crate::error::{ChainError, Result};
use javatools::Disassembler;

const CLASS_MODIFIERS: &[&str] = &["public", "abstract", "final"];

const ACCESS_KEYWORDS: &[&str] = &["public", "protected", "private"];

const MEMBER_MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "default",
];

/// 系统类解析器
pub struct SystemClassResolver<D> {
    disassembler: D,
}

impl<D: Disassembler> SystemClassResolver<D> {
    pub fn new(disassembler: D) -> Self {
        Self { disassembler }
    }

    pub async fn resolve(&self, class_name: &str) -> Result<ClassDescriptor> {
        let text = self
            .disassembler
            .disassemble(class_name)
            .await
            .map_err(|e| ChainError::DisassemblyNotFound {
                name: class_name.to_string(),
                reason: e.to_string(),
            })?;
        Ok(parse_disassembly(class_name, &text))
    }
}

enum Member {
    Field(FieldDescriptor),
    Method(MethodDescriptor),
}

/// 解析 javap 输出
pub fn parse_disassembly(class_name: &str, text: &str) -> ClassDescriptor {
    let lookup = erase_generics(class_name);
    let simple = simple_name(lookup).to_string();
    let library = is_runtime_name(lookup);

    let mut descriptor = ClassDescriptor {
        name: simple.clone(),
        package: lookup.rfind('.').map(|pos| lookup[..pos].to_string()),
        origin: Origin::Disassembly,
        library,
        ..Default::default()
    };

    let mut declared = false;
    // `Code:` 标题的缩进, 在字节码段内时为 Some
    let mut code_indent: Option<usize> = None;

    for raw in text.lines() {
        let line = raw.trim();
        let indent = raw.len() - raw.trim_start().len();

        if line.is_empty() {
            code_indent = None;
            continue;
        }
        // 缩进回到标题之外说明字节码段已结束
        if code_indent.is_some_and(|code| indent < code) {
            code_indent = None;
        }
        if line == "Code:" {
            code_indent = Some(indent);
            continue;
        }
        if code_indent.is_some() || line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }

        if !declared {
            if let Some((modifiers, extends)) = parse_declaration(line) {
                descriptor.modifiers = modifiers;
                descriptor.extends = extends;
                declared = true;
            }
            continue;
        }

        // 运行时库类只保留类和父类形状
        if library || !starts_with_access(line) {
            continue;
        }

        match parse_member_line(line, &simple) {
            Ok(Member::Field(f)) => descriptor.fields.push(f),
            Ok(Member::Method(m)) => descriptor.methods.push(m),
            Err(e) => tracing::debug!("{}: {}", class_name, e),
        }
    }

    descriptor
}

/// 类声明行: 修饰符 + 可选 extends
fn parse_declaration(line: &str) -> Option<(Vec<String>, Option<String>)> {
    let tokens = split_top_level(line, ' ');
    let class_pos = tokens.iter().position(|t| t == "class")?;

    let modifiers = tokens[..class_pos]
        .iter()
        .take_while(|t| CLASS_MODIFIERS.contains(&t.as_str()))
        .cloned()
        .collect();

    let extends = find_top_level(line, " extends ").map(|pos| {
        let rest = &line[pos + " extends ".len()..];
        let end = find_top_level(rest, " implements ")
            .or_else(|| find_top_level(rest, "{"))
            .unwrap_or(rest.len());
        rest[..end].trim().to_string()
    });

    Some((modifiers, extends.filter(|e| !e.is_empty())))
}

fn starts_with_access(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .map(|t| ACCESS_KEYWORDS.contains(&t))
        .unwrap_or(false)
}

fn parse_member_line(line: &str, class_simple: &str) -> Result<Member> {
    let line = line.trim_end_matches(';').trim();
    let malformed = || ChainError::MalformedMemberLine(line.to_string());

    if let Some(open) = line.find('(') {
        let close = line.rfind(')').filter(|c| *c > open).ok_or_else(malformed)?;
        let (modifiers, rest) = split_modifiers(split_top_level(&line[..open], ' '));

        // 泛型方法的类型参数 `<T>` 不参与判断
        let rest: Vec<String> = rest.into_iter().filter(|t| !t.starts_with('<')).collect();
        let name_token = rest.last().ok_or_else(malformed)?;
        let name = name_token.rsplit('.').next().unwrap_or(name_token).to_string();

        let parameters = split_top_level(&line[open + 1..close], ',')
            .into_iter()
            .map(|t| ParameterDescriptor {
                name: String::new(),
                type_name: t,
            })
            .collect();

        let return_type = if name == class_simple {
            String::new()
        } else if rest.len() >= 2 {
            rest[rest.len() - 2].clone()
        } else {
            return Err(malformed());
        };

        return Ok(Member::Method(MethodDescriptor {
            name,
            return_type,
            modifiers,
            parameters,
        }));
    }

    let declaration = line.split('=').next().unwrap_or(line);
    let (modifiers, rest) = split_modifiers(split_top_level(declaration, ' '));
    match rest.as_slice() {
        [type_name, name] => Ok(Member::Field(FieldDescriptor {
            name: name.clone(),
            type_name: type_name.clone(),
            modifiers,
        })),
        _ => Err(malformed()),
    }
}

fn split_modifiers(tokens: Vec<String>) -> (Vec<String>, Vec<String>) {
    let count = tokens
        .iter()
        .take_while(|t| MEMBER_MODIFIERS.contains(&t.as_str()))
        .count();
    let mut modifiers = tokens;
    let rest = modifiers.split_off(count);
    (modifiers, rest)
}

/// 在泛型尖括号之外按分隔符切分
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for c in text.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == sep && depth == 0 {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// 尖括号之外第一次出现的位置
fn find_top_level(text: &str, pattern: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        if depth == 0 && text[i..].starts_with(pattern) {
            return Some(i);
        }
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}
