//! Terminal rendering of presentation events and error banners.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use planton_backend::{
    prompt_missing_fields_stdin, BackendConfig, BackendError, BackendResult, ValidationResult,
    S3_COMPATIBLE_FLAGS,
};
use planton_iac::{IacError, IacResult, PresentationEvent, Presenter};
use planton_manifest::{ManifestError, Provisioner};
use planton_provider::{
    invalid_provider_config_guidance, kind_detection_error_guidance, ProviderError,
};
use planton_runner::RunnerError;

const RULE: &str = "────────────────────────────────────────────────────────────";

/// Prints events to stdout and prompts on stdin.
pub struct TerminalPresenter {
    interactive: bool,
}

impl TerminalPresenter {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Interactive when stdin is a terminal.
    pub fn detect() -> Self {
        Self::new(planton_backend::is_interactive())
    }
}

fn step(message: &str) {
    println!("{} {}", "●".cyan(), message);
}

fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

fn info(message: &str) {
    println!("{} {}", "📦", message);
}

fn warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message.yellow());
}

fn hint(message: &str) {
    println!("  {} {}", "→".dimmed(), message.dimmed());
}

impl Presenter for TerminalPresenter {
    fn event(&self, event: &PresentationEvent) {
        match event {
            PresentationEvent::ManifestLoaded { kind, name, .. } => {
                success(&format!("Manifest loaded ({} {})", kind, name.bold()));
            }
            PresentationEvent::OverridesApplied { count } => {
                success(&format!("Applied {} field override(s)", count));
            }
            PresentationEvent::Validated => success("Manifest validated"),
            PresentationEvent::ProvisionerDetected {
                provisioner,
                from_label,
            } => {
                let origin = if *from_label { "from manifest label" } else { "selected" };
                step(&format!(
                    "Using provisioner: {} ({})",
                    provisioner.as_str().bold(),
                    origin
                ));
            }
            PresentationEvent::KubeContextSelected { context } => {
                step(&format!("Using kubectl context: {}", context.bold()));
            }
            PresentationEvent::ProviderDetected {
                kind,
                provider,
                requires_credentials,
            } => {
                if *requires_credentials {
                    info(&format!(
                        "Detected resource: {} (requires {} credentials)",
                        kind,
                        provider.display_name()
                    ));
                } else {
                    info(&format!(
                        "Detected resource: {} (no provider credentials required)",
                        kind
                    ));
                }
            }
            PresentationEvent::CredentialsLoaded { provider, .. } => {
                success(&format!("Loaded {} provider credentials", provider.display_name()));
            }
            PresentationEvent::BackendIncomplete => {
                warning("Backend bucket or key is set but no backend type was given");
                hint("State will be stored locally. Set --backend-type or the backend.type label");
            }
            PresentationEvent::S3CompatibleDetected { reason } => {
                println!("{} {}", "ℹ".cyan(), "S3-compatible backend detected".bold());
                hint(reason);
                hint(&format!("Setting: {}", S3_COMPATIBLE_FLAGS.join(", ")));
            }
            PresentationEvent::BackendFieldsMissing { validation } => {
                print_missing_backend_fields(validation);
            }
            PresentationEvent::BackendResolved { config } => print_backend_summary(config),
            PresentationEvent::ExecutionPrepared {
                resource_id,
                module_dir,
            } => {
                success(&format!("Execution prepared for {}", resource_id.bold()));
                println!("{} Module path: {}", "⚙".cyan(), module_dir.display());
            }
            PresentationEvent::Handoff { tool } => {
                println!();
                println!("{} {}", "🤝", format!("Handing off to {}...", tool).bold());
                println!("{}", format!("Output below is from {}", tool).dimmed());
                println!("{}", RULE.dimmed());
            }
            PresentationEvent::ToolCompleted { tool, success: ok } => {
                println!("{}", RULE.dimmed());
                if *ok {
                    success(&format!("{} execution completed successfully", tool));
                } else {
                    println!("{}", format!("✗ {} Execution Failed", tool).red().bold());
                    if *tool == Provisioner::Pulumi.display_name() {
                        hint("Check the above output from Pulumi CLI to understand the root cause");
                    } else {
                        hint("Check the module configuration for syntax errors");
                        hint("Ensure all required provider credentials are configured");
                    }
                }
            }
        }
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn choose_provisioner(&self) -> IacResult<Option<Provisioner>> {
        warning("Provisioner not specified in manifest");
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        Ok(prompt_provisioner(&mut input, &mut output)?)
    }

    fn prompt_backend(
        &self,
        config: &mut BackendConfig,
        validation: &ValidationResult,
    ) -> BackendResult<()> {
        prompt_missing_fields_stdin(config, validation)
    }
}

/// Numbered provisioner choice; blank or invalid input yields `None`.
pub fn prompt_provisioner<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<Provisioner>> {
    let choices = Provisioner::choices();
    writeln!(output, "Select a provisioner:")?;
    for (i, p) in choices.iter().enumerate() {
        writeln!(output, "  {}) {}", i + 1, p.as_str())?;
    }
    write!(output, "Enter choice [1-{}]: ", choices.len())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();

    let chosen = answer
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.get(i).copied())
        .or_else(|| Provisioner::from_str(answer).filter(|p| *p != Provisioner::Unspecified));
    Ok(chosen)
}

fn print_backend_summary(config: &BackendConfig) {
    println!();
    println!("{}", "Backend Configuration".bold());
    let kind = config.type_str().unwrap_or("local (default)");
    println!("  Type:     {}", kind);
    if let Some(bucket) = config.bucket() {
        println!("  Bucket:   {}", bucket);
    }
    if let Some(key) = config.key() {
        println!("  Key:      {}", key);
    }
    if let Some(region) = config.region() {
        println!("  Region:   {}", region);
    }
    if let Some(endpoint) = config.endpoint() {
        println!("  Endpoint: {}", endpoint);
    }
    if config.s3_compatible {
        println!("  Mode:     S3-Compatible (R2/MinIO)");
    }
    println!();
}

fn print_missing_backend_fields(validation: &ValidationResult) {
    eprintln!();
    eprintln!(
        "{}",
        format!(
            "✗ Backend configuration incomplete ({} backend)",
            validation.backend_type
        )
        .red()
        .bold()
    );
    for field in validation.missing_fields.iter().filter(|f| f.required) {
        eprintln!();
        eprintln!("  {} {}", "Missing:".bold(), field.name);
        eprintln!("    {}", field.description);
        eprintln!("    Example:  {}", field.example);
        eprintln!("    CLI flag: {}", field.flag_name);
        if let Some(env) = field.env_var_name {
            eprintln!("    Env var:  {}", env);
        }
        eprintln!("    Label:    {}", field.label_name);
    }
    for w in &validation.warnings {
        eprintln!("  {} {}", "!".yellow(), w);
    }
}

/// Heading, message and optional tip on stderr.
fn banner(title: &str, message: &str, tip: Option<String>) {
    eprintln!();
    eprintln!("{}", format!("✗ {}", title).red().bold());
    eprintln!("{}", RULE.red());
    eprintln!("{}", message);
    if let Some(tip) = tip {
        eprintln!();
        eprintln!("{} {}", "💡", tip);
    }
    eprintln!();
}

fn unknown_kind_banner(kind: &str) {
    if kind.trim().is_empty() {
        banner(
            "Could Not Determine Resource Kind",
            &kind_detection_error_guidance(),
            None,
        );
        return;
    }

    let message = format!(
        "The kind '{}' is not supported by this version of project-planton.\n\n\
         Possible causes:\n  \
         - Extra characters in the kind value\n  \
         - Wrong capitalization (kinds are PascalCase, e.g. AwsS3Bucket)\n  \
         - A misspelled kind name\n\n\
         Remedies:\n  \
         - Upgrade the CLI if the kind was added recently\n  \
         - Verify the kind against the catalog of supported resources",
        kind
    );
    banner(
        "Unsupported Resource Kind",
        &message,
        Some("See supported kinds at https://project-planton.org/docs/resources".to_string()),
    );
}

fn manifest_banner(err: &ManifestError) {
    match err {
        ManifestError::UnknownKind(kind) => unknown_kind_banner(kind),
        ManifestError::ValidationFailed(violations) => {
            let details: Vec<String> = violations.iter().map(|v| format!("  - {}", v)).collect();
            banner(err.title(), &format!("{}\n\n{}", err, details.join("\n")), err.tip());
        }
        _ => banner(err.title(), &err.to_string(), err.tip()),
    }
}

fn provider_banner(err: &ProviderError) {
    match err {
        ProviderError::CredentialMalformed { provider, message } => banner(
            err.title(),
            &invalid_provider_config_guidance(*provider, message),
            None,
        ),
        ProviderError::CredentialMissingRequired { provider, .. } => banner(
            err.title(),
            &invalid_provider_config_guidance(*provider, &err.to_string()),
            None,
        ),
        _ => banner(err.title(), &err.to_string(), None),
    }
}

fn backend_banner(err: &BackendError) {
    match err {
        BackendError::BackendIncomplete(validation) => {
            banner(
                err.title(),
                &format!(
                    "Missing required backend field(s): {}",
                    validation.missing_names().join(", ")
                ),
                Some(
                    "Pass the --backend-* flags, set backend labels, or run interactively".to_string(),
                ),
            );
        }
        _ => banner(err.title(), &err.to_string(), None),
    }
}

fn runner_banner(err: &RunnerError) {
    banner(err.title(), &err.to_string(), err.tip());
}

/// Render `err` with the banner of its kind.
pub fn print_error(err: &anyhow::Error) {
    if let Some(e) = err.downcast_ref::<IacError>() {
        match e {
            IacError::Manifest(inner) => manifest_banner(inner),
            IacError::Provider(inner) => provider_banner(inner),
            IacError::Backend(inner) => backend_banner(inner),
            IacError::Runner(RunnerError::ChildProcessFailed { .. }) => {
                // The tool already reported the failure.
                eprintln!("{} {:#}", "✗".red(), err);
            }
            IacError::Runner(inner) => runner_banner(inner),
            IacError::ProvisionerRequired { label } => banner(
                e.title(),
                &format!("{}\n\nSet the '{}' label in metadata.labels.", e, label),
                e.tip(),
            ),
            _ => banner(e.title(), &e.to_string(), e.tip()),
        }
        return;
    }
    if let Some(e) = err.downcast_ref::<ManifestError>() {
        manifest_banner(e);
        return;
    }
    if let Some(e) = err.downcast_ref::<ProviderError>() {
        provider_banner(e);
        return;
    }
    if let Some(e) = err.downcast_ref::<BackendError>() {
        backend_banner(e);
        return;
    }
    eprintln!("{} {:#}", "❌ Error:".red().bold(), err);
}
