use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use crate::cli::commands::ScanArgs;
use crate::cli::progress::ScanProgress;
use crate::cli::{print_outcome, CliContext};
use crate::errors::CiphertraceError;
use crate::input::{ScanInput, UploadedFile};
use tracing::info;

pub async fn handle_scan(args: ScanArgs, ctx: &CliContext) -> Result<(), CiphertraceError> {
    let mut config = ctx.config.clone();
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    let registry = ctx.registry_with(&config)?;
    let service = registry.resolve(&args.tool)?;
    let input = read_input(&args).await?;

    info!(tool = %service.kind(), "Starting scan");

    // Progress bars only when a person is watching.
    let show_progress = !ctx.quiet && !args.json;
    let outcome = if show_progress {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let display = tokio::spawn(async move {
            let mut progress = ScanProgress::new();
            while let Some(event) = rx.recv().await {
                progress.handle_event(&event);
            }
            progress.finish();
        });
        let result = service.run(&input, Some(&tx)).await;
        drop(tx);
        let _ = display.await;
        result?
    } else {
        service.run(&input, None).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.session)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

async fn read_input(args: &ScanArgs) -> Result<ScanInput, CiphertraceError> {
    if !args.file.is_empty() {
        let mut files = Vec::with_capacity(args.file.len());
        for path in &args.file {
            files.push(UploadedFile::from_path(path).await?);
        }
        return Ok(ScanInput::files(files));
    }

    if args.stdin {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        return Ok(ScanInput::text(text));
    }

    match &args.text {
        Some(text) => Ok(ScanInput::text(text.clone())),
        None => Err(CiphertraceError::EmptyInput(
            "Pass --text, --file or --stdin".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ScanArgs {
        ScanArgs { tool: "document-scanner".into(), text: None, file: Vec::new(), stdin: false, seed: None, json: true }
    }

    #[tokio::test]
    async fn test_missing_input_is_empty_input() {
        let err = read_input(&args()).await.unwrap_err();
        assert!(matches!(err, CiphertraceError::EmptyInput(_)));
    }

    #[tokio::test]
    async fn test_files_are_read_by_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        tokio::fs::write(&path, vec![0u8; 2048]).await.unwrap();

        let mut args = args();
        args.file = vec![path];
        match read_input(&args).await.unwrap() {
            ScanInput::Files { files } => {
                assert_eq!(files[0].name, "invoice.pdf");
                assert_eq!(files[0].size_bytes, 2048);
            }
            other => panic!("expected files, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let mut args = args();
        args.file = vec![PathBuf::from("/no/such/file.pdf")];
        assert!(matches!(read_input(&args).await.unwrap_err(), CiphertraceError::Io(_)));
    }
}
