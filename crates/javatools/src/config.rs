//! 外部工具配置

/// 默认的祖先链深度上限
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// 工具配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub javap: String,
    pub javap_args: Vec<String>,
    pub classpath: Option<String>,
    pub plantuml: String,
    pub format: String,
    /// 外部结构化解析命令, 未设置时使用 tree-sitter
    pub parser_command: Option<String>,
    pub max_depth: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            javap: "javap".to_string(),
            javap_args: vec!["-p".to_string()],
            classpath: None,
            plantuml: "plantuml".to_string(),
            format: "png".to_string(),
            parser_command: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ToolConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[doc(hidden)]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("UMLCHAIN_JAVAP") {
            config.javap = v;
        }

        if let Some(v) = lookup("UMLCHAIN_JAVAP_ARGS") {
            config.javap_args = v.split_whitespace().map(str::to_string).collect();
        }

        if let Some(v) = lookup("UMLCHAIN_CLASSPATH") {
            if !v.is_empty() {
                config.classpath = Some(v);
            }
        }

        if let Some(v) = lookup("UMLCHAIN_PLANTUML") {
            config.plantuml = v;
        }

        if let Some(v) = lookup("UMLCHAIN_FORMAT") {
            config.format = v;
        }

        if let Some(v) = lookup("UMLCHAIN_PARSER") {
            if !v.is_empty() {
                config.parser_command = Some(v);
            }
        }

        if let Some(v) = lookup("UMLCHAIN_MAX_DEPTH") {
            if let Ok(d) = v.parse::<usize>() {
                if d > 0 {
                    config.max_depth = d;
                }
            }
        }

        config
    }
}
