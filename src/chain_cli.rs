//! diagram / scan subcommands

use anyhow::Context;
use clap::Subcommand;
use hierarchy::{
    DiagramRenderer, InheritanceChainBuilder, SourceClassResolver, SystemClassResolver,
};
use javatools::{
    collect_java_files, CommandParser, FsSourceLookup, Javap, PlantUml, SourceParser, ToolConfig,
    TreeSitterParser,
};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ChainCommands {
    /// Generate a class diagram for a source file or a library class
    Diagram {
        /// Java source file
        #[arg(required_unless_present = "class")]
        file: Option<PathBuf>,
        /// Library class instead of a source file (e.g. java.util.ArrayList)
        #[arg(long, conflicts_with = "file")]
        class: Option<String>,
        /// Output file for the PlantUML text
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Render an image into this directory with plantuml
        #[arg(long)]
        render: Option<PathBuf>,
        /// Max descriptors in the inheritance chain
        #[arg(long)]
        max_depth: Option<usize>,
        /// Classpath passed to javap
        #[arg(long)]
        classpath: Option<String>,
        /// Print the resolved descriptor tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// List Java types declared under a directory
    Scan {
        /// Project path
        path: PathBuf,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(cmd: ChainCommands, mut config: ToolConfig) -> anyhow::Result<()> {
    match cmd {
        ChainCommands::Diagram {
            file,
            class,
            output,
            render,
            max_depth,
            classpath,
            json,
        } => {
            if let Some(depth) = max_depth {
                config.max_depth = depth.max(1);
            }
            if classpath.is_some() {
                config.classpath = classpath;
            }
            cmd_diagram(
                &config,
                file.as_deref(),
                class.as_deref(),
                output.as_deref(),
                render.as_deref(),
                json,
            )
            .await
        }
        ChainCommands::Scan { path, json } => cmd_scan(&config, &path, json).await,
    }
}

fn make_parser(config: &ToolConfig) -> Box<dyn SourceParser> {
    match &config.parser_command {
        Some(command) => {
            tracing::info!("Using external parser: {}", command);
            Box::new(CommandParser::new(command))
        }
        None => Box::new(TreeSitterParser::new()),
    }
}

async fn cmd_diagram(
    config: &ToolConfig,
    file: Option<&Path>,
    class: Option<&str>,
    output: Option<&Path>,
    render: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let builder = InheritanceChainBuilder::new(
        SourceClassResolver::new(make_parser(config)),
        SystemClassResolver::new(Javap::from_config(config)),
        FsSourceLookup,
    )
    .with_max_depth(config.max_depth);

    let root = match (file, class) {
        (Some(path), _) => {
            let path = path
                .canonicalize()
                .with_context(|| format!("Cannot open {}", path.display()))?;
            tracing::info!("Resolving: {}", path.display());
            let source = std::fs::read_to_string(&path)?;
            builder.resolve(&source, Some(path.as_path())).await?
        }
        (None, Some(name)) => {
            tracing::info!("Resolving class: {}", name);
            builder.resolve_class(name).await?
        }
        (None, None) => anyhow::bail!("Either a source file or --class is required"),
    };

    tracing::info!("Chain depth: {}", root.depth());

    if json {
        println!("{}", serde_json::to_string_pretty(&root)?);
        return Ok(());
    }

    let diagram = DiagramRenderer::new().render(&root);

    if let Some(dir) = render {
        let image = PlantUml::from_config(config)
            .render(&diagram, &root.name, dir)
            .await?;
        println!("Saved to: {}", image.display());
    }

    match output {
        Some(file) => {
            std::fs::write(file, &diagram)?;
            println!("Saved to: {}", file.display());
        }
        None if render.is_none() => print!("{}", diagram),
        None => {}
    }

    Ok(())
}

async fn cmd_scan(config: &ToolConfig, path: &Path, json: bool) -> anyhow::Result<()> {
    let project_path = path
        .canonicalize()
        .with_context(|| format!("Cannot open {}", path.display()))?;
    tracing::info!("Scanning: {}", project_path.display());

    let resolver = SourceClassResolver::new(make_parser(config));
    let files = collect_java_files(&project_path)?;

    #[derive(serde::Serialize)]
    struct ScanItem {
        file: String,
        name: String,
        extends: Option<String>,
        implements: Vec<String>,
    }

    let mut items = Vec::new();
    for file in &files {
        let source = match std::fs::read_to_string(file) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", file.display(), e);
                continue;
            }
        };
        match resolver.resolve(&source, Some(file.as_path())).await {
            Ok(d) => items.push(ScanItem {
                file: file
                    .strip_prefix(&project_path)
                    .unwrap_or(file)
                    .display()
                    .to_string(),
                name: d.qualified_name(),
                extends: d.extends,
                implements: d.implements,
            }),
            Err(e) => tracing::warn!("Skipping {}: {}", file.display(), e),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("\nFound {} types in {} files:\n", items.len(), files.len());
        for item in &items {
            println!("  {}", item.file);
            let mut line = format!("    {}", item.name);
            if let Some(parent) = &item.extends {
                line.push_str(&format!(" extends {}", parent));
            }
            if !item.implements.is_empty() {
                line.push_str(&format!(" implements {}", item.implements.join(", ")));
            }
            println!("{}", line);
            println!();
        }
    }

    Ok(())
}
