//! Project Planton CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Any error (resolution, validation, credentials, backend, workspace or tool failure)

use std::process::ExitCode;

use clap::Parser;
use planton_iac::Operation;
use planton_manifest::Provisioner;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod presentation;

use commands::{Cli, Commands, HclCommand, PulumiCommand};

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for directive in [format!("planton={}", level), "warn".to_string()] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    // Ignore a subscriber that is already set.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn hcl_command(command: HclCommand, provisioner: Provisioner) -> HclDispatch {
    match command {
        HclCommand::Apply(args) => HclDispatch::Run(Operation::Apply, args, provisioner),
        HclCommand::Plan(args) => HclDispatch::Run(Operation::Plan, args, provisioner),
        HclCommand::Destroy(args) => HclDispatch::Run(Operation::Destroy, args, provisioner),
        HclCommand::Refresh(args) => HclDispatch::Run(Operation::Refresh, args, provisioner),
        HclCommand::Init(args) => HclDispatch::Run(Operation::Init, args, provisioner),
        HclCommand::LoadTfvars(args) => HclDispatch::LoadTfvars(args),
    }
}

enum HclDispatch {
    Run(Operation, commands::args::ProvisionArgs, Provisioner),
    LoadTfvars(commands::load_tfvars::LoadTfvarsArgs),
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    use commands::provision::execute as provision;

    match cli.command {
        Commands::Apply(args) => provision(Operation::Apply, args, None).await,
        Commands::Plan(args) => provision(Operation::Plan, args, None).await,
        Commands::Destroy(args) => provision(Operation::Destroy, args, None).await,
        Commands::Refresh(args) => provision(Operation::Refresh, args, None).await,
        Commands::Init(args) => provision(Operation::Init, args, None).await,
        Commands::LoadManifest(args) => commands::load_manifest::execute(args).await,
        Commands::ValidateManifest(args) => commands::validate_manifest::execute(args).await,
        Commands::Pull => commands::modules::pull().await,
        Commands::Checkout(args) => commands::modules::checkout(args).await,
        Commands::ModulesVersion => commands::modules::version().await,
        Commands::Version => commands::version::execute().await,
        Commands::Tofu(group) => match hcl_command(group.command, Provisioner::Tofu) {
            HclDispatch::Run(op, args, p) => provision(op, args, Some(p)).await,
            HclDispatch::LoadTfvars(args) => commands::load_tfvars::execute(args).await,
        },
        Commands::Terraform(group) => match hcl_command(group.command, Provisioner::Terraform) {
            HclDispatch::Run(op, args, p) => provision(op, args, Some(p)).await,
            HclDispatch::LoadTfvars(args) => commands::load_tfvars::execute(args).await,
        },
        Commands::Pulumi(group) => {
            let (op, args) = match group.command {
                PulumiCommand::Update(args) => (Operation::Apply, args),
                PulumiCommand::Preview(args) => (Operation::Plan, args),
                PulumiCommand::Destroy(args) => (Operation::Destroy, args),
                PulumiCommand::Refresh(args) => (Operation::Refresh, args),
                PulumiCommand::Init(args) => (Operation::Init, args),
            };
            provision(op, args, Some(Provisioner::Pulumi)).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presentation::print_error(&e);
            ExitCode::from(1)
        }
    }
}
