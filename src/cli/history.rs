use console::style;
use crate::cli::commands::{HistoryArgs, ShowArgs};
use crate::cli::{print_outcome, CliContext};
use crate::errors::CiphertraceError;
use crate::models::SessionOverview;
use crate::utils::formatting::format_duration;

pub async fn handle_history(args: HistoryArgs, ctx: &CliContext) -> Result<(), CiphertraceError> {
    let registry = ctx.open_registry()?;
    let services = match args.tool.as_deref() {
        Some(name) => vec![registry.resolve(name)?],
        None => registry.iter().cloned().collect(),
    };

    let mut sessions: Vec<SessionOverview> = Vec::new();
    for service in services {
        sessions.extend(service.history()?);
    }
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if let Some(limit) = args.limit {
        sessions.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        if !ctx.quiet {
            println!("No sessions recorded yet.");
        }
        return Ok(());
    }

    println!(
        "{}",
        style(format!("{:<20} {:<18} {:<36} {:>7} {:>8}", "CREATED", "TOOL", "SESSION", "RECORDS", "DURATION")).bold()
    );
    for session in &sessions {
        println!(
            "{:<20} {:<18} {:<36} {:>7} {:>8}  {}",
            session.created_at.format("%Y-%m-%d %H:%M:%S"),
            session.tool,
            session.id,
            session.record_count,
            format_duration(session.duration_ms),
            distribution_line(session),
        );
    }
    Ok(())
}

pub async fn handle_show(args: ShowArgs, ctx: &CliContext) -> Result<(), CiphertraceError> {
    let registry = ctx.open_registry()?;
    let service = registry.resolve(&args.tool)?;
    let outcome = service.inspect(args.session_id.as_deref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.session)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

/// `dangerous 2, safe 1`, skipping empty buckets.
fn distribution_line(session: &SessionOverview) -> String {
    session
        .summary
        .distribution
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(label, count)| format!("{} {}", label, count))
        .collect::<Vec<_>>()
        .join(", ")
}
