use clap::Parser;
use ciphertrace::cli::{self, CliContext, Commands, LogFormat};
use ciphertrace::config;
use ciphertrace::errors::CiphertraceError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.with_ansi(!cli.no_color).init(),
    }
    if cli.no_color {
        console::set_colors_enabled(false);
    }

    if let Err(e) = run(cli).await {
        let notice = e.notice();
        eprintln!("{}: {}", notice.title, notice.description);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: cli::Cli) -> Result<(), CiphertraceError> {
    // Validation reads its own file argument, not the global --config.
    if let Commands::Validate(args) = &cli.command {
        return handle_validate(args).await;
    }

    let config = config::load_config(cli.config.as_deref()).await?;
    let ctx = CliContext::new(config, cli.db, cli.quiet);

    match cli.command {
        Commands::Tools => cli::tools::handle_tools(&ctx).await,
        Commands::Scan(args) => cli::scan::handle_scan(args, &ctx).await,
        Commands::History(args) => cli::history::handle_history(args, &ctx).await,
        Commands::Show(args) => cli::history::handle_show(args, &ctx).await,
        Commands::Export(args) => cli::export::handle_export(args, &ctx).await,
        Commands::Reset(args) => cli::tools::handle_reset(args, &ctx).await,
        Commands::Serve(args) => cli::serve::handle_serve(args, &ctx).await,
        Commands::Validate(_) => Ok(()),
    }
}

async fn handle_validate(args: &cli::commands::ValidateArgs) -> Result<(), CiphertraceError> {
    let config = config::parse_config(&args.file).await?;
    println!("Configuration is valid: {}", args.file.display());
    println!("  database   {}", config.storage.db_path);
    println!("  exports    {}", config.storage.export_dir);
    println!("  server     {}:{}", config.server.host, config.server.port);
    println!("  rules      {}", config.access_policy().rules().len());
    Ok(())
}

fn exit_code(error: &CiphertraceError) -> i32 {
    match error {
        CiphertraceError::Config(_) | CiphertraceError::Yaml(_) => 2,
        CiphertraceError::InvalidInput(_)
        | CiphertraceError::EmptyInput(_)
        | CiphertraceError::UnsupportedFile(_)
        | CiphertraceError::UnknownTool(_) => 3,
        CiphertraceError::Authentication(_) | CiphertraceError::Permission(_) => 4,
        CiphertraceError::NotFound(_) => 5,
        _ => 1,
    }
}
