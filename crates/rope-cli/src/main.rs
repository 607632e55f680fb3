//! CLI binary for generating, verifying, linting and running rope pipelines.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rope_codegen::Layout;
use rope_pipeline::{Executor, FastPath, PipelineManifest, Severity};
use rope_types::RopeError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rope", version, about = "Typed data pipelines with a generated operator registry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the dispatch module and type stubs from the registry
    Generate {
        /// Workspace root (default: nearest ancestor holding the registry)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Fail if a generated artifact differs from what the registry produces
    Verify {
        /// Workspace root (default: nearest ancestor holding the registry)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// List every registered operator
    Ops {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lint a pipeline manifest
    Lint {
        /// Path to the pipeline .json manifest
        pipeline: PathBuf,
    },

    /// Run a pipeline manifest against a JSON input
    Run {
        /// Path to the pipeline .json manifest
        pipeline: PathBuf,

        /// Input value as JSON text (a bare string must be quoted)
        #[arg(short, long)]
        input: String,

        /// Convert the input generically even when the first step decodes JSON
        #[arg(long)]
        no_fast_path: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing; RUST_LOG wins over --verbose
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate { root } => {
            cmd_generate(&resolve_layout(root)?)?;
        }
        Commands::Verify { root } => {
            cmd_verify(&resolve_layout(root)?)?;
        }
        Commands::Ops { json } => {
            cmd_ops(json)?;
        }
        Commands::Lint { pipeline } => {
            cmd_lint(&pipeline)?;
        }
        Commands::Run {
            pipeline,
            input,
            no_fast_path,
        } => {
            cmd_run(&pipeline, &input, no_fast_path)?;
        }
    }

    Ok(())
}

fn resolve_layout(root: Option<PathBuf>) -> anyhow::Result<Layout> {
    if let Some(root) = root {
        return Ok(Layout::new(root));
    }
    let cwd = std::env::current_dir()?;
    Layout::discover(&cwd).ok_or_else(|| {
        anyhow::anyhow!(
            "No {} found above {}; pass --root",
            Layout::REGISTRY,
            cwd.display()
        )
    })
}

fn cmd_generate(layout: &Layout) -> anyhow::Result<()> {
    let artifacts = rope_codegen::generate(layout)?;
    rope_codegen::write_artifacts(&artifacts)?;
    for artifact in &artifacts {
        println!("Wrote {}", artifact.relative);
    }
    Ok(())
}

fn cmd_verify(layout: &Layout) -> anyhow::Result<()> {
    let drifted = rope_codegen::find_drift(layout)?;
    if drifted.is_empty() {
        println!("Generated artifacts are up to date");
        return Ok(());
    }

    for drift in &drifted {
        if let RopeError::Drift {
            artifact,
            line,
            expected,
            found,
        } = drift
        {
            println!("Drift in {artifact} at line {line}");
            println!("  expected: {}", expected.as_deref().unwrap_or("<end of file>"));
            println!("  found:    {}", found.as_deref().unwrap_or("<end of file>"));
        }
    }
    println!("Run `rope generate` to bring them back in sync");
    std::process::exit(1);
}

fn cmd_ops(json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rope_pipeline::DESCRIPTORS)?);
        return Ok(());
    }

    for namespace in rope_pipeline::NAMESPACES {
        println!("{namespace}:");
        for descriptor in rope_pipeline::DESCRIPTORS
            .iter()
            .filter(|d| d.namespace == *namespace || d.aliases.contains(namespace))
        {
            let params: Vec<String> = descriptor
                .params
                .iter()
                .map(|(name, ty)| format!("{name}: {ty}"))
                .collect();
            println!(
                "  {}({})  {}{}",
                descriptor.external_name,
                params.join(", "),
                descriptor.signature(),
                if descriptor.escape { "  [escape]" } else { "" }
            );
        }
    }
    Ok(())
}

fn load_blueprint(path: &Path) -> anyhow::Result<(PipelineManifest, rope_pipeline::Blueprint)> {
    let manifest = PipelineManifest::load(path)?;
    match manifest.to_blueprint() {
        Ok(blueprint) => Ok((manifest, blueprint)),
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            std::process::exit(1);
        }
    }
}

fn cmd_lint(path: &Path) -> anyhow::Result<()> {
    let (_, blueprint) = load_blueprint(path)?;
    let diagnostics = rope_pipeline::validate(&blueprint);

    if diagnostics.is_empty() {
        println!("Pipeline is valid");
        return Ok(());
    }

    let mut has_error = false;
    for diag in &diagnostics {
        if diag.severity == Severity::Error {
            has_error = true;
        }
        println!("[{}] {}: {}", diag.severity, diag.rule, diag.message);
    }

    if has_error {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_run(path: &Path, input: &str, no_fast_path: bool) -> anyhow::Result<()> {
    let (manifest, blueprint) = load_blueprint(path)?;
    let input: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| anyhow::anyhow!("--input is not valid JSON: {e}"))?;

    let mut config = manifest.config;
    if no_fast_path {
        config.fast_path = FastPath::Disabled;
    }
    tracing::debug!(steps = blueprint.len(), fast_path = ?config.fast_path, "Running pipeline");

    match Executor::new(config).run(&blueprint, &input) {
        Ok(output) => {
            println!("{}", serde_json::to_string(&output)?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            std::process::exit(1);
        }
    }
}
