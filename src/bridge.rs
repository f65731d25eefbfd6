//! Backend command bridge - The error taxonomy and the invoke seam.
//!
//! The runtime does not talk to a backend itself. Applications plug one in
//! through [`Invoke`] and get consistent error decoding and logging from
//! [`call`]. Rejections arrive as JSON tagged with a `type` discriminator:
//!
//! ```text
//! { "type": "ValidationError", "message": "name must not be empty" }
//! ```
//!
//! Anything that does not decode as one of the four kinds becomes a
//! [`CommandError::GeneralError`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

// =============================================================================
// CommandError
// =============================================================================

/// Error returned by a backend command.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CommandError {
    #[error("{0}")]
    GeneralError(String),
    /// Bad user input. Reported as a warning, not an error.
    #[error("validation failed: {0}")]
    ValidationError(String),
    #[error("I/O failed: {0}")]
    IOError(String),
    #[error("network failed: {0}")]
    NetworkError(String),
}

/// How loudly a [`CommandError`] should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl CommandError {
    /// Decode a rejection payload. Never fails: unknown kinds, missing
    /// messages and bare strings all become `GeneralError`.
    pub fn from_value(value: Value) -> Self {
        if let Ok(decoded) = serde_json::from_value::<CommandError>(value.clone()) {
            return decoded;
        }
        let message = match &value {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            other => other.to_string(),
        };
        CommandError::GeneralError(message)
    }

    /// Discriminator as sent on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::GeneralError(_) => "GeneralError",
            CommandError::ValidationError(_) => "ValidationError",
            CommandError::IOError(_) => "IOError",
            CommandError::NetworkError(_) => "NetworkError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::GeneralError(m)
            | CommandError::ValidationError(m)
            | CommandError::IOError(m)
            | CommandError::NetworkError(m) => m,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CommandError::ValidationError(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::IOError(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::GeneralError(err.to_string())
    }
}

// =============================================================================
// Invoke
// =============================================================================

/// A backend that runs named commands with JSON arguments.
#[allow(async_fn_in_trait)]
pub trait Invoke {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError>;
}

/// Invoke `command`, decoding the result into `T`.
///
/// Failures are logged (`warn` for validation errors, `error` otherwise)
/// with `context`, then returned to the caller.
pub async fn call<B, A, T>(backend: &B, command: &str, args: A, context: &str) -> Result<T, CommandError>
where
    B: Invoke,
    A: Serialize,
    T: DeserializeOwned,
{
    let result = async {
        let args = serde_json::to_value(args)?;
        let value = backend.invoke(command, args).await?;
        Ok::<T, CommandError>(serde_json::from_value(value)?)
    }
    .await;

    if let Err(err) = &result {
        report(err, command, context);
    }
    result
}

fn report(err: &CommandError, command: &str, context: &str) {
    match err.severity() {
        Severity::Warning => warn!(command, context, kind = err.kind(), "{}", err.message()),
        Severity::Error => error!(command, context, kind = err.kind(), "{}", err.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::RefCell;

    struct MockBackend {
        calls: RefCell<Vec<String>>,
    }

    impl Invoke for MockBackend {
        async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError> {
            self.calls.borrow_mut().push(command.to_string());
            match command {
                "greet" => {
                    let name = args["name"].as_str().unwrap_or_default().trim().to_string();
                    if name.is_empty() {
                        return Err(CommandError::ValidationError("name must not be empty".into()));
                    }
                    Ok(json!(format!("Hello, {name}!")))
                }
                "app_info" => Ok(json!({ "name": "spark-dom", "version": "0.1.0" })),
                _ => Err(CommandError::from_value(json!({ "type": "Unknown", "message": "no such command" }))),
            }
        }
    }

    fn backend() -> MockBackend {
        MockBackend {
            calls: RefCell::new(Vec::new()),
        }
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct AppInfo {
        name: String,
        version: String,
    }

    #[test]
    fn test_wire_shape() {
        let err = CommandError::IOError("disk full".into());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "type": "IOError", "message": "disk full" })
        );
        assert_eq!(
            CommandError::from_value(json!({ "type": "NetworkError", "message": "offline" })),
            CommandError::NetworkError("offline".into())
        );
    }

    #[test]
    fn test_from_value_falls_back_to_general() {
        assert_eq!(
            CommandError::from_value(json!({ "type": "Weird", "message": "m" })),
            CommandError::GeneralError("m".into())
        );
        assert_eq!(
            CommandError::from_value(json!("plain")),
            CommandError::GeneralError("plain".into())
        );
        assert_eq!(
            CommandError::from_value(json!(42)).message(),
            "42"
        );
    }

    #[test]
    fn test_severity() {
        assert_eq!(CommandError::ValidationError("x".into()).severity(), Severity::Warning);
        assert_eq!(CommandError::IOError("x".into()).severity(), Severity::Error);
        assert_eq!(CommandError::GeneralError("x".into()).kind(), "GeneralError");
    }

    #[test]
    fn test_call_decodes_result() {
        let backend = backend();
        let greeting: String = block_on(call(&backend, "greet", json!({ "name": "Ada" }), "greeting")).unwrap();
        assert_eq!(greeting, "Hello, Ada!");

        let info: AppInfo = block_on(call(&backend, "app_info", (), "info")).unwrap();
        assert_eq!(info.name, "spark-dom");
        assert_eq!(info.version, "0.1.0");
        assert_eq!(*backend.calls.borrow(), vec!["greet", "app_info"]);
    }

    #[test]
    fn test_call_returns_errors() {
        let backend = backend();
        let err = block_on(call::<_, _, String>(&backend, "greet", json!({ "name": " " }), "greeting"))
            .unwrap_err();
        assert_eq!(err, CommandError::ValidationError("name must not be empty".into()));

        let err = block_on(call::<_, _, AppInfo>(&backend, "greet", json!({ "name": "x" }), "info"))
            .unwrap_err();
        assert!(matches!(err, CommandError::GeneralError(_)));

        let err = block_on(call::<_, _, Value>(&backend, "nope", (), "missing")).unwrap_err();
        assert_eq!(err, CommandError::GeneralError("no such command".into()));
    }
}
