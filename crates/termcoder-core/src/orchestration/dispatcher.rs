//! Tool dispatch
//!
//! Every tool call the model makes goes through [`ToolDispatcher::dispatch`]:
//!
//! 1. Look up the tool; unknown names fail immediately.
//! 2. For the shell tool, screen the command with the dangerous-command
//!    interceptor. A match is blocked in every mode and nothing else runs.
//! 3. Ask the permission gate. A denial fails with the gate's reason.
//! 4. Execute the tool and wrap its result in a [`ToolOutput`].
//!
//! Nothing escapes this boundary: tool errors and panics both come back as
//! failure envelopes.

use futures::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

use crate::approval::{Confirmer, DangerCheck, DangerousCommandInterceptor, PermissionGate, PermissionMode, Verdict};
use crate::tools::{RUN_BASH, ToolDefinition, ToolOutput, ToolRegistry};

/// Routes tool calls through the interceptor and the gate to the executors
pub struct ToolDispatcher {
    registry: ToolRegistry,
    gate: PermissionGate,
    interceptor: DangerousCommandInterceptor,
}

impl ToolDispatcher {
    pub fn new(registry: ToolRegistry, gate: PermissionGate) -> Self {
        Self {
            registry,
            gate,
            interceptor: DangerousCommandInterceptor::new(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Tool descriptors sent to the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.list()
    }

    /// Run one tool call to completion
    pub async fn dispatch(
        &self,
        name: &str,
        args: &Value,
        mode: PermissionMode,
        confirmer: &dyn Confirmer,
    ) -> ToolOutput {
        let Some(tool) = self.registry.get(name) else {
            warn!(tool = name, "Model requested unknown tool");
            return ToolOutput::error(format!("Unknown tool: {}", name));
        };

        if name == RUN_BASH
            && let Some(command) = args.get("command").and_then(Value::as_str)
            && let DangerCheck::Dangerous { explanation } = self.interceptor.check(command)
        {
            warn!(command, reason = explanation, "Blocked dangerous command");
            return ToolOutput::blocked(command, explanation);
        }

        if let Verdict::Denied { reason } = self.gate.authorize(name, args, mode, confirmer).await {
            info!(tool = name, %mode, "Tool call denied");
            return ToolOutput::error(reason);
        }

        debug!(tool = name, "Executing tool");
        match AssertUnwindSafe(tool.execute(args.clone())).catch_unwind().await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!(tool = name, error = %e, "Tool failed");
                ToolOutput::from(e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(tool = name, panic = %message, "Tool panicked");
                ToolOutput::error(format!("Tool {} failed unexpectedly: {}", name, message))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
