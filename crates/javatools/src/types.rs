use serde::{Deserialize, Serialize};

/// 结构化解析结果 - 一个编译单元的顶层类型声明
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedClass {
    pub name: String,
    /// 包名 (package 声明)
    #[serde(default)]
    pub package: Option<String>,
    /// 声明类型: "class", "interface", "enum", "record"
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<ParsedField>,
    #[serde(default)]
    pub methods: Vec<ParsedMethod>,
}

fn default_kind() -> String {
    "class".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMethod {
    pub name: String,
    /// 构造函数为空
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub parameters: Vec<ParsedParameter>,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_class_from_collaborator_json() {
        let json = r#"{
            "name": "Shape",
            "modifiers": ["public", "abstract"],
            "annotations": [],
            "extends": null,
            "implements": ["Comparable<Shape>"],
            "fields": [{"name": "id", "type": "int", "modifiers": ["private"]}],
            "methods": [{
                "name": "area",
                "returnType": "double",
                "parameters": [{"name": "scale", "type": "double"}],
                "modifiers": ["public", "abstract"]
            }]
        }"#;

        let parsed: ParsedClass = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.name, "Shape");
        assert_eq!(parsed.kind, "class");
        assert_eq!(parsed.package, None);
        assert_eq!(parsed.fields[0].type_name, "int");
        assert_eq!(parsed.methods[0].return_type, "double");
        assert_eq!(parsed.methods[0].parameters[0].name, "scale");
    }

    #[test]
    fn test_parsed_class_missing_lists_default_empty() {
        let parsed: ParsedClass = serde_json::from_str(r#"{"name": "Empty"}"#).unwrap();
        assert!(parsed.modifiers.is_empty());
        assert!(parsed.methods.is_empty());
        assert!(parsed.extends.is_none());
    }
}
