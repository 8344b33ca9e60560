use super::super::args::VisualizeArgs;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use wseval_core::report::breakdown;

pub(crate) fn run(args: VisualizeArgs) -> anyhow::Result<i32> {
    let rows = breakdown::read_records(&args.data_path)?;
    let b = breakdown::breakdown(&rows);
    print!("{}", breakdown::render_table(&b));

    if let Some(parent) = args
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&args.output_path, breakdown::render_svg(&b))
        .with_context(|| format!("failed to write {}", args.output_path.display()))?;
    tracing::info!("wrote {}", args.output_path.display());
    Ok(SUCCESS)
}
