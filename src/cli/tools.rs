use console::style;
use crate::cli::commands::ResetArgs;
use crate::cli::CliContext;
use crate::errors::CiphertraceError;

pub async fn handle_tools(ctx: &CliContext) -> Result<(), CiphertraceError> {
    let registry = ctx.open_registry()?;
    for descriptor in registry.descriptors() {
        println!("{} {}", style(descriptor.kind).bold(), style(format!("({})", descriptor.name)).dim());
        let input = if descriptor.accepted_extensions.is_empty() {
            descriptor.input.to_string()
        } else {
            format!("{}: {}", descriptor.input, descriptor.accepted_extensions.join(", "))
        };
        println!("  input    {}", input);
        println!("  risk     {}", descriptor.risk_levels.join(" < "));
        println!("  history  last {} sessions", descriptor.history_cap);
        if !ctx.quiet {
            let phases: Vec<&str> = descriptor.phases.iter().map(|p| p.name).collect();
            println!("  phases   {}", phases.join(" → "));
        }
        println!();
    }
    Ok(())
}

pub async fn handle_reset(args: ResetArgs, ctx: &CliContext) -> Result<(), CiphertraceError> {
    let registry = ctx.open_registry()?;
    let service = registry.resolve(&args.tool)?;
    let cleared = service.reset()?;
    if !ctx.quiet {
        if cleared {
            println!("Cleared the current {} session; history is kept.", service.kind());
        } else {
            println!("{} had no current session.", service.kind());
        }
    }
    Ok(())
}
