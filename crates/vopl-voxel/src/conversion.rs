//! Boundary to the external conversion service.
//!
//! Richer transcoding (VOPL files, packed VOPL archives, GLB meshes) lives in
//! a separately built native service. This crate only hands it byte buffers
//! and inspects what comes back. Replies are untrusted: anything other than
//! the expected well-formed success, including a panic inside the service,
//! comes back as a [`ConversionError`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use thiserror::Error;

/// Operations exposed by the conversion service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConversionOp {
    /// `.vopl` bytes to a binary glTF mesh.
    VoplToGlb,
    /// VPI18 bitstream to `.vopl` bytes.
    Vpi18ToVopl,
    /// `.vopl` bytes to a VPI18 bitstream.
    VoplToVpi18,
    /// Several `.vopl` files into one archive.
    PackVopls,
    /// Archive back into its `.vopl` files.
    UnpackVoplpack,
    /// `.vopl` bytes to a header/grid document.
    DecodeVopl,
}

impl ConversionOp {
    /// Name the service uses for this operation.
    pub fn name(self) -> &'static str {
        match self {
            Self::VoplToGlb => "vopl2glb",
            Self::Vpi18ToVopl => "vpi18ToVopl",
            Self::VoplToVpi18 => "voplToVpi18",
            Self::PackVopls => "packVopls",
            Self::UnpackVoplpack => "unpackVoplpack",
            Self::DecodeVopl => "decodeVopl",
        }
    }
}

impl fmt::Display for ConversionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw reply from the service.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceReply {
    /// A byte buffer.
    Buffer(Vec<u8>),
    /// A structured result.
    Document(Value),
    /// The service reported an error.
    Failure(String),
}

/// An external conversion service.
pub trait ConversionService {
    /// Runs `op` on `input`.
    fn call(&self, op: ConversionOp, input: &[u8]) -> ServiceReply;
}

impl<F> ConversionService for F
where
    F: Fn(ConversionOp, &[u8]) -> ServiceReply,
{
    fn call(&self, op: ConversionOp, input: &[u8]) -> ServiceReply {
        self(op, input)
    }
}

/// A conversion that did not produce a usable result.
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    /// The service reported a failure.
    #[error("{op} failed: {message}")]
    Service {
        /// Requested operation.
        op: ConversionOp,
        /// Message from the service.
        message: String,
    },
    /// The service replied with the wrong kind of result.
    #[error("{op} returned {found}, expected {expected}")]
    UnexpectedReply {
        /// Requested operation.
        op: ConversionOp,
        /// What the caller needed.
        expected: &'static str,
        /// What came back.
        found: &'static str,
    },
    /// The service panicked.
    #[error("{op} panicked: {message}")]
    Panicked {
        /// Requested operation.
        op: ConversionOp,
        /// Panic payload, if it was a string.
        message: String,
    },
}

/// Checked access to a [`ConversionService`].
pub struct ConversionBoundary<S> {
    service: S,
}

impl<S: ConversionService> ConversionBoundary<S> {
    /// Wraps `service`.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Runs `op`, expecting a byte buffer.
    ///
    /// # Errors
    ///
    /// Any other reply, a reported failure, or a panic.
    pub fn convert_bytes(&self, op: ConversionOp, input: &[u8]) -> Result<Vec<u8>, ConversionError> {
        match self.call(op, input)? {
            ServiceReply::Buffer(bytes) => Ok(bytes),
            other => Err(unexpected(op, "a byte buffer", &other)),
        }
    }

    /// Runs `op`, expecting a JSON object.
    ///
    /// # Errors
    ///
    /// Any other reply (including non-object documents), a reported failure,
    /// or a panic.
    pub fn convert_document(&self, op: ConversionOp, input: &[u8]) -> Result<Value, ConversionError> {
        match self.call(op, input)? {
            ServiceReply::Document(doc @ Value::Object(_)) => Ok(doc),
            other => Err(unexpected(op, "a document object", &other)),
        }
    }

    fn call(&self, op: ConversionOp, input: &[u8]) -> Result<ServiceReply, ConversionError> {
        let reply = panic::catch_unwind(AssertUnwindSafe(|| self.service.call(op, input)))
            .map_err(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                tracing::warn!("conversion service panicked during {op}: {message}");
                ConversionError::Panicked { op, message }
            })?;
        match reply {
            ServiceReply::Failure(message) => Err(ConversionError::Service { op, message }),
            reply => Ok(reply),
        }
    }
}

fn unexpected(op: ConversionOp, expected: &'static str, reply: &ServiceReply) -> ConversionError {
    let found = match reply {
        ServiceReply::Buffer(_) => "a byte buffer",
        ServiceReply::Document(Value::Object(_)) => "a document object",
        ServiceReply::Document(_) => "a non-object document",
        ServiceReply::Failure(_) => "a failure",
    };
    ConversionError::UnexpectedReply {
        op,
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo(_: ConversionOp, input: &[u8]) -> ServiceReply {
        ServiceReply::Buffer(input.iter().rev().copied().collect())
    }

    #[test]
    fn test_buffer_reply() {
        let boundary = ConversionBoundary::new(echo);
        let out = boundary.convert_bytes(ConversionOp::Vpi18ToVopl, &[1, 2, 3]).unwrap();
        assert_eq!(out, vec![3, 2, 1]);
    }

    #[test]
    fn test_document_reply() {
        let boundary = ConversionBoundary::new(|_: ConversionOp, _: &[u8]| {
            ServiceReply::Document(json!({"header": {"w": 16}, "grid": []}))
        });
        let doc = boundary.convert_document(ConversionOp::DecodeVopl, &[]).unwrap();
        assert_eq!(doc["header"]["w"], 16);
    }

    #[test]
    fn test_wrong_variant_is_error() {
        let boundary = ConversionBoundary::new(echo);
        assert_eq!(
            boundary.convert_document(ConversionOp::DecodeVopl, &[]),
            Err(ConversionError::UnexpectedReply {
                op: ConversionOp::DecodeVopl,
                expected: "a document object",
                found: "a byte buffer",
            })
        );

        let boundary =
            ConversionBoundary::new(|_: ConversionOp, _: &[u8]| ServiceReply::Document(json!(42)));
        assert!(matches!(
            boundary.convert_document(ConversionOp::DecodeVopl, &[]),
            Err(ConversionError::UnexpectedReply { found: "a non-object document", .. })
        ));
        assert!(matches!(
            boundary.convert_bytes(ConversionOp::VoplToGlb, &[]),
            Err(ConversionError::UnexpectedReply { .. })
        ));
    }

    #[test]
    fn test_service_failure_is_error() {
        let boundary = ConversionBoundary::new(|_: ConversionOp, _: &[u8]| {
            ServiceReply::Failure("bad header".to_string())
        });
        let err = boundary.convert_bytes(ConversionOp::VoplToGlb, &[]).unwrap_err();
        assert_eq!(err.to_string(), "vopl2glb failed: bad header");
    }

    #[test]
    fn test_panic_is_contained() {
        let boundary = ConversionBoundary::new(|_: ConversionOp, _: &[u8]| -> ServiceReply {
            panic!("service exploded")
        });
        assert_eq!(
            boundary.convert_bytes(ConversionOp::PackVopls, &[]),
            Err(ConversionError::Panicked {
                op: ConversionOp::PackVopls,
                message: "service exploded".to_string(),
            })
        );
    }
}
