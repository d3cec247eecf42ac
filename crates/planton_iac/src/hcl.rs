//! OpenTofu and Terraform dispatch.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use planton_backend::{backend_config_args, write_backend_file, BackendConfig};
use planton_manifest::Provisioner;
use planton_runner::{CommandSpec, ExecutionResult, LineSink, ProcessRunner};
use tracing::info;

use crate::error::IacResult;
use crate::operation::Operation;
use crate::tfvars::PLAN_FILE_NAME;

/// Flags that shape the HCL command lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HclOptions {
    pub auto_approve: bool,
    /// `plan --destroy`
    pub destroy_plan: bool,
    pub reconfigure: bool,
    /// `-json` output streamed line by line
    pub json: bool,
}

/// `init --var-file <tfvars> [-json] [--reconfigure] [--backend-config v]...`
pub fn init_args(tfvars: &Path, backend_values: &[String], options: &HclOptions) -> Vec<String> {
    let mut args = vec![
        Operation::Init.as_str().to_string(),
        "--var-file".to_string(),
        tfvars.to_string_lossy().into_owned(),
    ];
    if options.json {
        args.push("-json".to_string());
    }
    if options.reconfigure {
        args.push("--reconfigure".to_string());
    }
    args.extend(backend_config_args(backend_values));
    args
}

/// `<op> --var-file <tfvars>` plus the per-operation flags.
pub fn operation_args(operation: Operation, tfvars: &Path, options: &HclOptions) -> Vec<String> {
    let mut args = vec![
        operation.as_str().to_string(),
        "--var-file".to_string(),
        tfvars.to_string_lossy().into_owned(),
    ];

    if operation == Operation::Plan {
        args.push("--out".to_string());
        args.push(PLAN_FILE_NAME.to_string());
        if options.destroy_plan {
            args.push("--destroy".to_string());
        }
    }
    if operation.is_mutating() && options.auto_approve {
        args.push("--auto-approve".to_string());
    }
    if options.json {
        args.push("-json".to_string());
    }
    args
}

/// Runs the HCL binary of one provisioner in a module directory.
pub struct HclRunner {
    runner: Arc<dyn ProcessRunner>,
    provisioner: Provisioner,
}

impl HclRunner {
    pub fn new(runner: Arc<dyn ProcessRunner>, provisioner: Provisioner) -> Self {
        Self { runner, provisioner }
    }

    pub fn binary(&self) -> &'static str {
        self.provisioner.binary()
    }

    pub fn display_name(&self) -> &'static str {
        self.provisioner.display_name()
    }

    /// Fail with install guidance when the binary is not on PATH.
    pub fn check_available(&self) -> IacResult<PathBuf> {
        Ok(self.runner.locate(self.binary(), self.display_name())?)
    }

    /// Write `backend.tf` and run `init`.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &self,
        module_dir: &Path,
        tfvars: &Path,
        backend: &BackendConfig,
        backend_values: &[String],
        env: &BTreeMap<String, String>,
        options: &HclOptions,
        sink: Option<&LineSink>,
    ) -> IacResult<ExecutionResult> {
        write_backend_file(module_dir, backend)?;
        let args = init_args(tfvars, backend_values, options);
        self.run(module_dir, args, env, options, sink)
    }

    pub fn run_operation(
        &self,
        module_dir: &Path,
        operation: Operation,
        tfvars: &Path,
        env: &BTreeMap<String, String>,
        options: &HclOptions,
        sink: Option<&LineSink>,
    ) -> IacResult<ExecutionResult> {
        let args = operation_args(operation, tfvars, options);
        self.run(module_dir, args, env, options, sink)
    }

    fn run(
        &self,
        module_dir: &Path,
        args: Vec<String>,
        env: &BTreeMap<String, String>,
        options: &HclOptions,
        sink: Option<&LineSink>,
    ) -> IacResult<ExecutionResult> {
        info!("{} module directory: {}", self.binary(), module_dir.display());
        let spec = CommandSpec::new(self.binary())
            .args(args)
            .current_dir(module_dir)
            .envs(env.iter())
            .streaming(options.json);
        let sink = if options.json { sink.cloned() } else { None };
        Ok(self.runner.run(&spec, sink)?)
    }
}
