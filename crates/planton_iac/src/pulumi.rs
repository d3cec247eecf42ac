//! Pulumi dispatch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use planton_manifest::Provisioner;
use planton_runner::{CommandSpec, ExecutionResult, LineSink, ProcessRunner};
use tracing::info;

use crate::error::IacResult;
use crate::operation::Operation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PulumiOptions {
    /// Adds `--yes`.
    pub auto_approve: bool,
    /// Adds `--diff`.
    pub diff: bool,
}

impl PulumiOptions {
    /// Auto-approve everything but previews, unless `yes` forces it on.
    pub fn for_operation(operation: Operation, yes: bool, diff: bool) -> Self {
        Self {
            auto_approve: yes || operation != Operation::Plan,
            diff,
        }
    }
}

/// `stack select --create <fqdn>`
pub fn select_args(stack_fqdn: &str) -> Vec<String> {
    ["stack", "select", "--create", stack_fqdn]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// `<up|preview|refresh|destroy> --stack <fqdn> [--yes] [--diff]`; `None` for `init`.
pub fn operation_args(operation: Operation, stack_fqdn: &str, options: &PulumiOptions) -> Option<Vec<String>> {
    let command = operation.pulumi_command()?;
    let mut args = vec![command.to_string(), "--stack".to_string(), stack_fqdn.to_string()];
    if options.auto_approve {
        args.push("--yes".to_string());
    }
    if options.diff {
        args.push("--diff".to_string());
    }
    Some(args)
}

pub struct PulumiRunner {
    runner: Arc<dyn ProcessRunner>,
}

impl PulumiRunner {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    pub fn check_available(&self) -> IacResult<PathBuf> {
        let p = Provisioner::Pulumi;
        Ok(self.runner.locate(p.binary(), p.display_name())?)
    }

    pub fn select_stack(
        &self,
        module_dir: &Path,
        stack_fqdn: &str,
        env: &BTreeMap<String, String>,
    ) -> IacResult<ExecutionResult> {
        info!("Selecting Pulumi stack {}", stack_fqdn);
        let spec = CommandSpec::new("pulumi")
            .args(select_args(stack_fqdn))
            .current_dir(module_dir)
            .envs(env.iter());
        Ok(self.runner.run(&spec, None)?)
    }

    /// Run the operation; `Ok(None)` for `init`, which only selects the stack.
    pub fn run_operation(
        &self,
        module_dir: &Path,
        operation: Operation,
        stack_fqdn: &str,
        env: &BTreeMap<String, String>,
        options: &PulumiOptions,
        sink: Option<&LineSink>,
    ) -> IacResult<Option<ExecutionResult>> {
        let Some(args) = operation_args(operation, stack_fqdn, options) else {
            return Ok(None);
        };
        info!("pulumi module directory: {}", module_dir.display());
        let spec = CommandSpec::new("pulumi")
            .args(args)
            .current_dir(module_dir)
            .envs(env.iter())
            .streaming(sink.is_some());
        Ok(Some(self.runner.run(&spec, sink.cloned())?))
    }
}
