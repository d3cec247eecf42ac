//! `apply`, `plan`, `destroy`, `refresh` and `init`.

use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use planton_iac::{Engine, Operation};
use planton_manifest::Provisioner;
use tracing::{debug, info};

use super::args::ProvisionArgs;
use crate::presentation::TerminalPresenter;

/// Run `operation`, with the provisioner forced by a tool group when given.
pub async fn execute(
    operation: Operation,
    args: ProvisionArgs,
    provisioner: Option<Provisioner>,
) -> Result<()> {
    let engine = Engine::from_env()?;
    let presenter = TerminalPresenter::detect();

    let mut request = args.to_request();
    request.provisioner = provisioner;

    // -json lines are printed as they arrive.
    let printer = if args.json {
        let (tx, rx) = mpsc::channel::<String>();
        request.output = Some(tx);
        Some(thread::spawn(move || {
            for line in rx {
                println!("{}", line);
            }
        }))
    } else {
        None
    };

    info!("Running {}", operation);
    let outcome = engine.run(operation, &request, &presenter).await;

    // Closing the sender ends the printer loop.
    drop(request);
    if let Some(handle) = printer {
        if handle.join().is_err() {
            debug!("JSON output printer panicked");
        }
    }

    let outcome = outcome?;
    debug!(
        "{} of {} finished in {:?} ({} states)",
        outcome.operation,
        outcome.resource_id,
        outcome.result.as_ref().map(|r| r.duration_ms),
        outcome.states.len()
    );
    Ok(())
}
