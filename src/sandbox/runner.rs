//! Sandbox Runner
//!
//! Entry point for script execution. `run` never fails: parse errors,
//! thrown values and exceeded limits all end up as a single
//! `Execution Error` line in the returned HTML.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::console::ConsoleBuffer;
use super::host::ScriptHost;
use super::interpreter::Interpreter;
use super::parser::parse;

/// Scripts run on their own thread so deep recursion has room.
const SCRIPT_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Execution caps applied to every script run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxLimits {
    /// Total loop iterations allowed across the whole run.
    pub max_loop_iterations: u64,
    /// Maximum nesting of script function calls.
    pub max_call_depth: usize,
    /// Maximum nesting of statement and expression evaluation, across calls.
    pub max_eval_depth: usize,
    /// Longest array a script may build.
    pub max_array_length: usize,
    /// Longest string (in bytes) a script may build.
    pub max_string_length: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            max_loop_iterations: 100_000,
            max_call_depth: 256,
            max_eval_depth: 2_000,
            max_array_length: 1_000_000,
            max_string_length: 1 << 24,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SandboxRunner {
    limits: SandboxLimits,
}

impl SandboxRunner {
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SandboxLimits {
        &self.limits
    }

    /// Run `code` against `host` and return the captured output, trimmed.
    pub fn run(&self, code: &str, host: &mut dyn ScriptHost) -> String {
        debug!("sandbox: running script ({} bytes)", code.len());
        let limits = self.limits;

        let threaded = std::thread::scope(|scope| {
            std::thread::Builder::new()
                .name("sandbox".to_string())
                .stack_size(SCRIPT_STACK_SIZE)
                .spawn_scoped(scope, || execute(code, &mut *host, limits))
                .map(|handle| handle.join())
        });

        let output = match threaded {
            Ok(Ok(output)) => output,
            Ok(Err(_)) => {
                warn!("sandbox: script thread panicked");
                let mut console = ConsoleBuffer::new();
                console.execution_error("internal error");
                console.finish()
            }
            Err(err) => {
                warn!("sandbox: could not spawn script thread ({}), running inline", err);
                execute(code, host, limits)
            }
        };
        debug!("sandbox: finished ({} bytes of output)", output.len());
        output
    }
}

fn execute(code: &str, host: &mut dyn ScriptHost, limits: SandboxLimits) -> String {
    let mut interpreter = Interpreter::new(host, limits);
    interpreter.install_globals();
    let outcome = parse(code).and_then(|program| interpreter.run(&program));
    let mut console = interpreter.into_console();
    if let Err(err) = outcome {
        warn!("sandbox: execution error: {}", err);
        console.execution_error(&err.to_string());
    }
    console.finish()
}
