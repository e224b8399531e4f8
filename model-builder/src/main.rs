use model_builder::{build_model, BuilderConfig};
use service_core::observability::init_tracing;

fn main() -> anyhow::Result<()> {
    init_tracing("model-builder", "info", None);

    let config = BuilderConfig::load()?;
    let report = build_model(&config)?;

    println!(
        "{} file generated successfully.",
        report.output_path.display()
    );
    Ok(())
}
