use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Error value returned by a backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFault {
    pub message: String,
}

impl BackendFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendFault {}

/// Capability to invoke a remote operation.
///
/// `operation` is the fully-qualified name (`package.Service.op`) and `args` holds
/// one converted value per signature parameter, in signature order. How the call
/// travels (wire framing, connection handling) is up to the implementation.
pub trait Backend: Send + Sync {
    fn invoke(&self, operation: &str, args: Vec<Value>) -> Result<Value, BackendFault>;
}

/// Operation implementation registered with an [`InProcessBackend`].
pub type OperationFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, BackendFault> + Send + Sync>;

/// Backend that runs operations as local closures, keyed by fully-qualified name.
#[derive(Clone, Default)]
pub struct InProcessBackend {
    operations: HashMap<String, OperationFn>,
}

impl InProcessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation. A second registration under the same name replaces the first.
    pub fn register<F>(&mut self, operation: &str, f: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, BackendFault> + Send + Sync + 'static,
    {
        if self
            .operations
            .insert(operation.to_string(), Arc::new(f))
            .is_some()
        {
            warn!(
                operation = %operation,
                total_operations = self.operations.len(),
                "Replaced existing operation"
            );
        } else {
            info!(
                operation = %operation,
                total_operations = self.operations.len(),
                "Operation registered"
            );
        }
    }

    /// Builder form of [`InProcessBackend::register`].
    #[must_use]
    pub fn with<F>(mut self, operation: &str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, BackendFault> + Send + Sync + 'static,
    {
        self.register(operation, f);
        self
    }

    pub fn contains(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }
}

impl fmt::Debug for InProcessBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.operations.keys().collect();
        names.sort();
        f.debug_struct("InProcessBackend")
            .field("operations", &names)
            .finish()
    }
}

impl Backend for InProcessBackend {
    fn invoke(&self, operation: &str, args: Vec<Value>) -> Result<Value, BackendFault> {
        let Some(f) = self.operations.get(operation) else {
            let available: Vec<&String> = self.operations.keys().collect();
            warn!(
                operation = %operation,
                available_operations = ?available,
                "Operation not registered"
            );
            return Err(BackendFault::new(format!(
                "operation '{operation}' is not registered"
            )));
        };
        debug!(operation = %operation, arg_count = args.len(), "Invoking operation");
        f(args)
    }
}

/// Backend that answers every call with `{"operation": .., "args": [..]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBackend;

impl Backend for EchoBackend {
    fn invoke(&self, operation: &str, args: Vec<Value>) -> Result<Value, BackendFault> {
        Ok(json!({ "operation": operation, "args": args }))
    }
}
