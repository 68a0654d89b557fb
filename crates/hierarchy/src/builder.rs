use crate::descriptor::{erase_generics, simple_name, ClassDescriptor, Origin, ROOT_TYPE};
use crate::error::{ChainError, Result};
use crate::source::SourceClassResolver;
use crate::system::SystemClassResolver;
use javatools::{Disassembler, SourceLookup, SourceParser, DEFAULT_MAX_DEPTH};
use std::path::Path;

/// 简单名回退时依次尝试的命名空间
pub const FALLBACK_NAMESPACES: &[&str] = &[
    "java.lang",
    "java.util",
    "java.io",
    "java.applet",
    "javax.swing",
    "java.awt",
    "java.net",
    "java.sql",
    "javax.servlet",
    "java.math",
    "java.security",
    "java.text",
    "java.time",
];

const APPLET_NAMESPACE: &str = "java.applet";

/// 候选全限定名, 按尝试顺序排列且不重复
pub fn candidate_names(name: &str) -> Vec<String> {
    let literal = erase_generics(name).to_string();
    let simple = simple_name(&literal).to_string();

    let mut candidates = vec![literal];
    if simple == "Applet" {
        candidates.push(format!("{}.{}", APPLET_NAMESPACE, simple));
    }
    for ns in FALLBACK_NAMESPACES {
        candidates.push(format!("{}.{}", ns, simple));
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

/// 一次成功的父类解析
#[derive(Debug)]
pub struct Resolved {
    pub descriptor: ClassDescriptor,
    /// 实际命中的名字, 写回子类的 extends
    pub matched: String,
}

/// 继承链构建器
pub struct InheritanceChainBuilder<P, D, L> {
    source: SourceClassResolver<P>,
    system: SystemClassResolver<D>,
    lookup: L,
    max_depth: usize,
}

impl<P, D, L> InheritanceChainBuilder<P, D, L>
where
    P: SourceParser,
    D: Disassembler,
    L: SourceLookup,
{
    pub fn new(source: SourceClassResolver<P>, system: SystemClassResolver<D>, lookup: L) -> Self {
        Self {
            source,
            system,
            lookup,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// 链上描述符数量上限 (含根)
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// 解析根类源码并构建完整继承链, 只有根类解析失败会返回错误
    pub async fn resolve(&self, source: &str, file_path: Option<&Path>) -> Result<ClassDescriptor> {
        let root = self.source.resolve(source, file_path).await?;
        Ok(self.build(root).await)
    }

    /// 从全限定名 (或简单名) 出发构建库类的继承链
    pub async fn resolve_class(&self, name: &str) -> Result<ClassDescriptor> {
        let resolved = self.resolve_with_fallback(name).await?;
        Ok(self.build(resolved.descriptor).await)
    }

    /// 逐级解析父类, 失败的一环视为父类未知
    pub async fn build(&self, root: ClassDescriptor) -> ClassDescriptor {
        let mut system_only = root.origin == Origin::Disassembly;
        let mut chain = vec![root];

        while chain.len() < self.max_depth {
            let Some(current) = chain.last_mut() else {
                break;
            };
            let Some(extends) = current.extends.clone() else {
                break;
            };

            let step = if system_only {
                self.system_step(&extends).await
            } else {
                self.project_step(current, &extends).await
            };

            let Some(resolved) = step else {
                break;
            };

            current.extends = Some(resolved.matched);
            if resolved.descriptor.origin == Origin::Disassembly {
                system_only = true;
            }
            chain.push(resolved.descriptor);
        }

        if chain.len() >= self.max_depth {
            if let Some(extends) = chain.last().and_then(|d| d.extends.as_deref()) {
                tracing::debug!("Depth bound {} reached before {}", self.max_depth, extends);
            }
        }

        link(chain)
    }

    /// 依次尝试所有候选名, 第一个成功的胜出
    pub async fn resolve_with_fallback(&self, name: &str) -> Result<Resolved> {
        let mut last_error = None;

        for candidate in candidate_names(name) {
            match self.system.resolve(&candidate).await {
                Ok(descriptor) => {
                    tracing::debug!("Resolved {} as {}", name, candidate);
                    return Ok(Resolved {
                        descriptor,
                        matched: candidate,
                    });
                }
                Err(e) => {
                    tracing::debug!("Candidate {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        Err(ChainError::DisassemblyNotFound {
            name: name.to_string(),
            reason: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidates".to_string()),
        })
    }

    /// 项目模式: 先找同目录源文件, 找不到再回退到系统类
    async fn project_step(&self, current: &ClassDescriptor, extends: &str) -> Option<Resolved> {
        if let Some(dir) = current.file_path.as_deref().and_then(Path::parent) {
            match self.lookup.find_sibling(dir, simple_name(extends)) {
                Ok(Some((path, text))) => {
                    return match self.source.resolve(&text, Some(path.as_path())).await {
                        Ok(descriptor) => Some(Resolved {
                            matched: descriptor.diagram_name(),
                            descriptor,
                        }),
                        Err(e) => {
                            tracing::warn!(
                                "Ancestor {} of {} unresolved: {}",
                                extends,
                                current.name,
                                e
                            );
                            None
                        }
                    };
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!("Sibling lookup for {} failed: {}", extends, e);
                }
            }
        }

        match self.resolve_with_fallback(extends).await {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                tracing::warn!("Ancestor {} of {} unresolved: {}", extends, current.name, e);
                None
            }
        }
    }

    /// 系统模式: 只用反汇编, 到 java.lang.Object 为止
    async fn system_step(&self, extends: &str) -> Option<Resolved> {
        let lookup = erase_generics(extends);
        if lookup == ROOT_TYPE {
            return None;
        }

        match self.system.resolve(lookup).await {
            Ok(descriptor) => Some(Resolved {
                descriptor,
                matched: lookup.to_string(),
            }),
            Err(e) => {
                tracing::warn!("System ancestor {} unresolved: {}", lookup, e);
                None
            }
        }
    }
}

/// 把列表折叠成独占的 parent 链
fn link(chain: Vec<ClassDescriptor>) -> ClassDescriptor {
    let mut reversed = chain.into_iter().rev();
    let last = reversed.next().unwrap_or_default();
    reversed.fold(last, |parent, mut child| {
        child.parent = Some(Box::new(parent));
        child
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use javatools::{ParsedClass, ToolError};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// 源码即 "Name:Parent" 形式, 方便构造
    struct LineParser;

    #[async_trait]
    impl SourceParser for LineParser {
        async fn parse(&self, source: &str) -> javatools::Result<Option<ParsedClass>> {
            let source = source.trim();
            if source.is_empty() {
                return Ok(None);
            }
            let mut parts = source.splitn(2, ':');
            let name = parts.next().unwrap_or_default().to_string();
            let extends = parts.next().map(str::to_string);
            Ok(Some(ParsedClass {
                name,
                kind: "class".into(),
                extends,
                ..Default::default()
            }))
        }
    }

    #[derive(Default)]
    struct FakeJavap {
        classes: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeJavap {
        fn with(mut self, name: &str, text: &str) -> Self {
            self.classes.insert(name.to_string(), text.to_string());
            self
        }
    }

    #[async_trait]
    impl<'a> Disassembler for &'a FakeJavap {
        async fn disassemble(&self, class_name: &str) -> javatools::Result<String> {
            self.calls.lock().unwrap().push(class_name.to_string());
            self.classes.get(class_name).cloned().ok_or_else(|| ToolError::CommandFailed {
                command: "javap".into(),
                status: "exit status: 1".into(),
                stderr: format!("Error: class not found: {}", class_name),
            })
        }
    }

    #[derive(Default)]
    struct MapLookup(HashMap<String, String>);

    impl SourceLookup for MapLookup {
        fn find_sibling(
            &self,
            dir: &Path,
            simple_name: &str,
        ) -> javatools::Result<Option<(PathBuf, String)>> {
            Ok(self
                .0
                .get(simple_name)
                .map(|text| (dir.join(format!("{}.java", simple_name)), text.clone())))
        }
    }

    /// 目录不可读
    struct FailingLookup;

    impl SourceLookup for FailingLookup {
        fn find_sibling(
            &self,
            _dir: &Path,
            _simple_name: &str,
        ) -> javatools::Result<Option<(PathBuf, String)>> {
            Err(ToolError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "permission denied",
            )))
        }
    }

    fn builder<'a>(
        javap: &'a FakeJavap,
        lookup: MapLookup,
    ) -> InheritanceChainBuilder<LineParser, &'a FakeJavap, MapLookup> {
        InheritanceChainBuilder::new(
            SourceClassResolver::new(LineParser),
            SystemClassResolver::new(javap),
            lookup,
        )
    }

    const EXCEPTION: &str = "public class java.lang.Exception extends java.lang.Throwable {\n}";
    const THROWABLE: &str = "public class java.lang.Throwable implements java.io.Serializable {\n}";

    #[test]
    fn test_candidate_names_order() {
        let names = candidate_names("Exception");
        assert_eq!(names[0], "Exception");
        assert_eq!(names[1], "java.lang.Exception");
        assert_eq!(names[2], "java.util.Exception");
        assert_eq!(names.last().map(String::as_str), Some("java.time.Exception"));
        assert_eq!(names.len(), 14);
    }

    #[test]
    fn test_candidate_names_applet_first() {
        let names = candidate_names("Applet");
        assert_eq!(names[0], "Applet");
        assert_eq!(names[1], "java.applet.Applet");
        assert_eq!(names[2], "java.lang.Applet");
        assert_eq!(names.iter().filter(|n| *n == "java.applet.Applet").count(), 1);
    }

    #[test]
    fn test_candidate_names_qualified_literal() {
        let names = candidate_names("java.util.AbstractList<E>");
        assert_eq!(names[0], "java.util.AbstractList");
        assert_eq!(names[1], "java.lang.AbstractList");
        assert_eq!(names.iter().filter(|n| *n == "java.util.AbstractList").count(), 1);
    }

    #[tokio::test]
    async fn test_no_extends_is_depth_one() {
        let javap = FakeJavap::default();
        let b = builder(&javap, MapLookup::default());
        let d = b.resolve("A", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.depth(), 1);
        assert!(javap.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_ancestor_runs_full_pipeline() {
        let javap = FakeJavap::default();
        let lookup = MapLookup(
            [("B".to_string(), "B:C".to_string()), ("C".to_string(), "C".to_string())].into(),
        );
        let b = builder(&javap, lookup);

        let d = b.resolve("A:B", Some(Path::new("/p/A.java"))).await.unwrap();
        let names: Vec<_> = d.chain().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(d.extends.as_deref(), Some("B"));

        let b_desc = d.parent.as_deref().unwrap();
        assert_eq!(b_desc.file_path.as_deref(), Some(Path::new("/p/B.java")));
        assert_eq!(b_desc.origin, Origin::Source);
    }

    #[tokio::test]
    async fn test_fallback_rewrites_extends() {
        let javap = FakeJavap::default()
            .with("java.lang.Exception", EXCEPTION)
            .with("java.lang.Throwable", THROWABLE);
        let b = builder(&javap, MapLookup::default());

        let d = b.resolve("A:Exception", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.extends.as_deref(), Some("java.lang.Exception"));

        let names: Vec<_> = d.chain().map(|c| c.qualified_name()).collect();
        assert_eq!(names, vec!["A", "java.lang.Exception", "java.lang.Throwable"]);
        assert!(d.last_ancestor().extends.is_none());

        // 字面名先试, 然后 java.lang 命中, 之后只走系统类
        let calls = javap.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["Exception", "java.lang.Exception", "java.lang.Throwable"]);
    }

    #[tokio::test]
    async fn test_system_walk_skips_local_lookup() {
        let javap = FakeJavap::default().with(
            "java.lang.Exception",
            "public class java.lang.Exception extends java.lang.Throwable {\n}",
        );
        // 同目录下有 Throwable.java, 进入系统模式后不应再使用
        let lookup = MapLookup([("Throwable".to_string(), "Throwable".to_string())].into());
        let b = builder(&javap, lookup);

        let d = b.resolve("A:Exception", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.depth(), 2);
        let last = d.last_ancestor();
        assert_eq!(last.name, "Exception");
        assert!(last.has_unresolved_parent());
    }

    #[tokio::test]
    async fn test_system_walk_stops_at_root_type() {
        let javap = FakeJavap::default().with(
            "java.lang.Thing",
            "public class java.lang.Thing extends java.lang.Object {\n}",
        );
        let b = builder(&javap, MapLookup::default());

        let d = b.resolve("A:Thing", None).await.unwrap();
        assert_eq!(d.depth(), 2);
        assert_eq!(d.last_ancestor().extends.as_deref(), Some("java.lang.Object"));
        assert!(!javap.calls.lock().unwrap().iter().any(|c| c == "java.lang.Object"));
    }

    #[tokio::test]
    async fn test_unresolvable_ancestor_degrades() {
        let javap = FakeJavap::default();
        let b = builder(&javap, MapLookup::default());

        let d = b.resolve("A:Nowhere", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.depth(), 1);
        assert_eq!(d.extends.as_deref(), Some("Nowhere"));
        assert!(d.has_unresolved_parent());
        assert_eq!(javap.calls.lock().unwrap().len(), candidate_names("Nowhere").len());
    }

    #[tokio::test]
    async fn test_sibling_lookup_error_falls_back_to_candidates() {
        let javap = FakeJavap::default()
            .with("java.lang.Exception", EXCEPTION)
            .with("java.lang.Throwable", THROWABLE);
        let b = InheritanceChainBuilder::new(
            SourceClassResolver::new(LineParser),
            SystemClassResolver::new(&javap),
            FailingLookup,
        );

        let d = b.resolve("A:Exception", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.extends.as_deref(), Some("java.lang.Exception"));
        assert_eq!(d.depth(), 3);

        let calls = javap.calls.lock().unwrap().clone();
        assert_eq!(calls[0], "Exception");
        assert_eq!(calls[1], "java.lang.Exception");
        assert_eq!(calls[2], "java.lang.Throwable");
    }

    #[tokio::test]
    async fn test_broken_sibling_degrades() {
        let javap = FakeJavap::default();
        let lookup = MapLookup([("B".to_string(), "   ".to_string())].into());
        let b = builder(&javap, lookup);

        let d = b.resolve("A:B", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.depth(), 1);
        assert!(d.has_unresolved_parent());
        assert!(javap.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_reference_hits_depth_bound() {
        let javap = FakeJavap::default();
        let lookup = MapLookup([("A".to_string(), "A:A".to_string())].into());
        let b = builder(&javap, lookup);

        let d = b.resolve("A:A", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.depth(), 10);
        assert!(d.last_ancestor().has_unresolved_parent());
    }

    #[tokio::test]
    async fn test_custom_depth_bound() {
        let javap = FakeJavap::default();
        let lookup = MapLookup([("A".to_string(), "A:A".to_string())].into());
        let b = builder(&javap, lookup).with_max_depth(3);

        let d = b.resolve("A:A", Some(Path::new("/p/A.java"))).await.unwrap();
        assert_eq!(d.depth(), 3);
    }

    #[tokio::test]
    async fn test_root_parse_failure_surfaces() {
        let javap = FakeJavap::default();
        let b = builder(&javap, MapLookup::default());
        let err = b.resolve("", None).await.unwrap_err();
        assert!(matches!(err, ChainError::ParseFailure(_)));
    }

    #[tokio::test]
    async fn test_resolve_class_from_library_name() {
        let javap = FakeJavap::default()
            .with("java.lang.Exception", EXCEPTION)
            .with("java.lang.Throwable", THROWABLE);
        let b = builder(&javap, MapLookup::default());

        let d = b.resolve_class("Exception").await.unwrap();
        assert_eq!(d.qualified_name(), "java.lang.Exception");
        assert_eq!(d.depth(), 2);

        let err = b.resolve_class("Nope").await.unwrap_err();
        assert!(matches!(err, ChainError::DisassemblyNotFound { .. }));
    }
}
