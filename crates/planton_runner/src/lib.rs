//! # planton_runner
//!
//! Child process execution for the IaC tools driven by Project Planton.
//!
//! # Features
//!
//! - **Command Specs**: Program, arguments, working directory and child-only environment
//! - **PATH Checks**: Missing binaries reported with install guidance
//! - **Streaming**: Optional line-by-line stdout forwarding with a panic-safe reader
//! - **Mock Runner**: Records commands for tests without real binaries
//!
//! # Example
//!
//! ```rust,no_run
//! use planton_runner::{CommandSpec, ProcessRunner, SystemRunner};
//!
//! let runner = SystemRunner::new();
//! let tofu = runner.locate("tofu", "OpenTofu").unwrap();
//!
//! let spec = CommandSpec::new(tofu.to_string_lossy())
//!     .args(["plan", "--var-file", ".terraform/terraform.tfvars"])
//!     .current_dir("/tmp/module")
//!     .env("AWS_REGION", "us-east-1");
//!
//! let result = runner.run(&spec, None).unwrap();
//! println!("finished in {}ms", result.duration_ms);
//! ```

pub mod command;
pub mod error;
pub mod mock;
pub mod runner;

pub use command::{format_command, CommandSpec, OutputMode};
pub use error::{install_hint, RunnerError, RunnerResult};
pub use mock::{MockResponse, MockRunner};
pub use runner::{ExecutionResult, LineSink, ProcessRunner, SystemRunner};
