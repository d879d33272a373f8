use std::path::PathBuf;
use crate::cli::commands::ExportArgs;
use crate::cli::CliContext;
use crate::errors::CiphertraceError;
use crate::export::{write_artifact, ExportFormat};
use crate::view::{ResultFilter, Selection};

pub async fn handle_export(args: ExportArgs, ctx: &CliContext) -> Result<(), CiphertraceError> {
    let registry = ctx.open_registry()?;
    let service = registry.resolve(&args.tool)?;
    let format: ExportFormat = args.format.parse()?;

    let filter = ResultFilter {
        risk: args.risk.clone(),
        category: args.category.clone(),
        search: args.search.clone(),
    };
    let selection = Selection::from_ids(args.select.iter().map(|id| id.trim()));
    let artifact = service.export(args.session.as_deref(), format, &filter, &selection)?;

    if args.stdout {
        print!("{}", artifact.body);
        return Ok(());
    }

    let dir = args.out.clone().unwrap_or_else(|| PathBuf::from(&ctx.config.storage.export_dir));
    let path = write_artifact(&dir, &artifact).await?;
    if !ctx.quiet {
        println!("Exported {} to {}", format, path.display());
    }
    Ok(())
}
