//! Pipe-delimited RPC frame encoding and response envelope decoding.
//!
//! A request frame is a flat list of fields joined with `|` and terminated by
//! a trailing `|`:
//!
//! ```text
//! version|flags|string-count|strings...|payload...|
//! ```
//!
//! The string table holds every string the call references; the payload
//! refers to them by 1-based index. Argument types are never inferred: each
//! argument carries the literal type tag the remote method expects.

use std::fmt;

use serde_json::Value;

use crate::error::DecodeError;

/// Wire protocol version written as the first field of every frame.
pub const PROTOCOL_VERSION: u32 = 7;

/// Frame flags written as the second field of every frame.
pub const FRAME_FLAGS: u32 = 0;

/// Status marker of a successful response.
pub const OK_MARKER: &str = "//OK";

const MARKER_LEN: usize = 4;

const REDACTED: &str = "[REDACTED]";

/// Literal wire type identifier of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag(&'static str);

impl TypeTag {
    /// Boxed 32-bit integer.
    pub const INTEGER: TypeTag = TypeTag("java.lang.Integer/3438268394");
    /// String.
    pub const STRING: TypeTag = TypeTag("java.lang.String/2004016611");
    /// Primitive 32-bit integer.
    pub const INT: TypeTag = TypeTag("I");

    /// A type tag outside the built-in vocabulary, such as an enum class.
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    /// Returns the literal tag.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Value of a single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcValue {
    /// Written as a back-reference to the interned string.
    Str(String),
    /// Primitive integer, written inline.
    Int(i64),
    /// Boxed integer, written as its type tag followed by the value.
    Boxed(i64),
    /// Enum constant, written as its type tag followed by the ordinal.
    Enum(u32),
}

/// An argument together with its declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedArg {
    pub tag: TypeTag,
    pub value: RpcValue,
}

impl TypedArg {
    pub fn new(tag: TypeTag, value: RpcValue) -> Self {
        Self { tag, value }
    }
}

/// A single RPC request, ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    pub module_base: String,
    pub service_strong_name: &'static str,
    pub service_name: &'static str,
    pub method: &'static str,
    pub args: Vec<TypedArg>,
}

impl RpcRequest {
    /// Encode the request as a frame.
    ///
    /// Encoding is deterministic: the same request always yields the same
    /// string.
    pub fn encode(&self) -> String {
        self.encode_frame(false)
    }

    /// Encode the request with the string table entries of string arguments
    /// replaced by `[REDACTED]`. Every other field matches [`encode`].
    ///
    /// [`encode`]: RpcRequest::encode
    pub fn encode_redacted(&self) -> String {
        self.encode_frame(true)
    }

    fn encode_frame(&self, redact: bool) -> String {
        let mut strings = StringTable::default();
        let mut payload: Vec<String> = Vec::new();
        let mut secrets: Vec<usize> = Vec::new();

        for header in [
            self.module_base.as_str(),
            self.service_strong_name,
            self.service_name,
            self.method,
        ] {
            payload.push(strings.intern(header).to_string());
        }

        payload.push(self.args.len().to_string());
        for arg in &self.args {
            payload.push(strings.intern(arg.tag.as_str()).to_string());
        }

        for arg in &self.args {
            match &arg.value {
                RpcValue::Str(s) => {
                    let index = strings.intern(s);
                    secrets.push(index);
                    payload.push(index.to_string());
                }
                RpcValue::Int(n) => payload.push(n.to_string()),
                RpcValue::Boxed(n) => {
                    payload.push(strings.intern(arg.tag.as_str()).to_string());
                    payload.push(n.to_string());
                }
                RpcValue::Enum(ordinal) => {
                    payload.push(strings.intern(arg.tag.as_str()).to_string());
                    payload.push(ordinal.to_string());
                }
            }
        }

        let mut fields = Vec::with_capacity(3 + strings.len() + payload.len());
        fields.push(PROTOCOL_VERSION.to_string());
        fields.push(FRAME_FLAGS.to_string());
        fields.push(strings.len().to_string());
        fields.extend(strings.entries.iter().enumerate().map(|(i, s)| {
            if redact && secrets.contains(&(i + 1)) {
                REDACTED.to_string()
            } else {
                escape(s)
            }
        }));
        fields.extend(payload);

        let mut frame = fields.join("|");
        frame.push('|');
        frame
    }
}

#[derive(Default)]
struct StringTable {
    entries: Vec<String>,
}

impl StringTable {
    /// Returns the 1-based index of `s`, appending it on first use.
    fn intern(&mut self, s: &str) -> usize {
        match self.entries.iter().position(|e| e == s) {
            Some(i) => i + 1,
            None => {
                self.entries.push(s.to_string());
                self.entries.len()
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '|' => out.push_str("\\!"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

/// A failed call as reported by the service.
///
/// `detail` is the full decoded array, normally shaped
/// `[category, code, [messageClass, message, ...], ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcFailure {
    /// Status marker without the leading `//`, normally `EX`.
    pub kind: String,
    pub detail: Vec<Value>,
}

impl RpcFailure {
    /// Returns the exception class string at its conventional position.
    pub fn message_class(&self) -> Option<&str> {
        self.detail
            .get(2)
            .and_then(Value::as_array)
            .and_then(|table| table.first())
            .and_then(Value::as_str)
    }

    /// Returns the human-readable message following the exception class.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .get(2)
            .and_then(Value::as_array)
            .and_then(|table| table.get(1))
            .and_then(Value::as_str)
    }
}

impl fmt::Display for RpcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.kind)?;
        if let Some(class) = self.message_class() {
            write!(f, "{class}")?;
            if let Some(message) = self.message() {
                write!(f, ": {message}")?;
            }
            write!(f, " ")?;
        }
        write!(f, "{}", Value::Array(self.detail.clone()))
    }
}

/// Decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResult {
    Ok(Vec<Value>),
    Failure(RpcFailure),
}

/// Decode a response body into a result.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the body is too short to hold a status
/// marker, or if the rest is not a JSON array.
pub fn decode(body: &str) -> Result<RpcResult, DecodeError> {
    let (marker, rest) = match (body.get(..MARKER_LEN), body.get(MARKER_LEN..)) {
        (Some(marker), Some(rest)) => (marker, rest),
        _ => {
            return Err(DecodeError::Truncated {
                body: body.to_string(),
            });
        }
    };

    let value: Value = serde_json::from_str(rest).map_err(|source| DecodeError::InvalidJson {
        body: body.to_string(),
        source,
    })?;

    let Value::Array(items) = value else {
        return Err(DecodeError::NotAnArray {
            body: body.to_string(),
        });
    };

    if marker == OK_MARKER {
        Ok(RpcResult::Ok(items))
    } else {
        Ok(RpcResult::Failure(RpcFailure {
            kind: marker.trim_start_matches('/').to_string(),
            detail: items,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: &'static str, args: Vec<TypedArg>) -> RpcRequest {
        RpcRequest {
            module_base: "https://cronometer.com/cronometer/".to_string(),
            service_strong_name: "STRONG",
            service_name: "svc.Service",
            method,
            args,
        }
    }

    #[test]
    fn boxed_integer_references_its_type() {
        let frame = request(
            "authenticate",
            vec![TypedArg::new(TypeTag::INTEGER, RpcValue::Boxed(-480))],
        )
        .encode();

        assert_eq!(
            frame,
            "7|0|5|https://cronometer.com/cronometer/|STRONG|svc.Service|authenticate|\
             java.lang.Integer/3438268394|1|2|3|4|1|5|5|-480|"
        );
    }

    #[test]
    fn repeated_tags_are_interned_once() {
        let scope = TypeTag::new("pkg.Scope/1");
        let frame = request(
            "m",
            vec![
                TypedArg::new(TypeTag::STRING, RpcValue::Str("abc".to_string())),
                TypedArg::new(TypeTag::INT, RpcValue::Int(42)),
                TypedArg::new(TypeTag::INT, RpcValue::Int(3600)),
                TypedArg::new(scope, RpcValue::Enum(2)),
            ],
        )
        .encode();

        assert_eq!(
            frame,
            "7|0|8|https://cronometer.com/cronometer/|STRONG|svc.Service|m|\
             java.lang.String/2004016611|I|pkg.Scope/1|abc|1|2|3|4|4|5|6|6|7|8|42|3600|7|2|"
        );
    }

    #[test]
    fn string_argument_equal_to_header_reuses_index() {
        let frame = request(
            "m",
            vec![TypedArg::new(
                TypeTag::STRING,
                RpcValue::Str("svc.Service".to_string()),
            )],
        )
        .encode();
        assert!(frame.ends_with("|1|2|3|4|1|5|3|"));
        assert!(frame.starts_with("7|0|5|"));
    }

    #[test]
    fn escapes_separators_in_strings() {
        let frame = request(
            "m",
            vec![TypedArg::new(
                TypeTag::STRING,
                RpcValue::Str("a|b\\c".to_string()),
            )],
        )
        .encode();
        assert!(frame.contains("|a\\!b\\\\c|"));
    }

    #[test]
    fn redacted_frame_keeps_back_references() {
        let scope = TypeTag::new("pkg.Scope/1");
        let frame = request(
            "m",
            vec![
                TypedArg::new(TypeTag::STRING, RpcValue::Str("1".to_string())),
                TypedArg::new(TypeTag::INT, RpcValue::Int(1)),
                TypedArg::new(scope, RpcValue::Enum(1)),
            ],
        )
        .encode_redacted();

        assert_eq!(
            frame,
            "7|0|8|https://cronometer.com/cronometer/|STRONG|svc.Service|m|\
             java.lang.String/2004016611|I|pkg.Scope/1|[REDACTED]|1|2|3|4|3|5|6|7|8|1|7|1|"
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let req = request(
            "m",
            vec![
                TypedArg::new(TypeTag::STRING, RpcValue::Str("nonce".to_string())),
                TypedArg::new(TypeTag::INT, RpcValue::Int(7)),
            ],
        );
        assert_eq!(req.encode(), req.clone().encode());
    }

    #[test]
    fn decodes_ok() {
        let result = decode("//OK[1,2,3]").unwrap();
        assert_eq!(result, RpcResult::Ok(vec![json!(1), json!(2), json!(3)]));
    }

    #[test]
    fn decodes_failure_with_full_detail() {
        let result = decode(r#"//EX["cat","code",["X/123","msg"]]"#).unwrap();
        let RpcResult::Failure(failure) = result else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, "EX");
        assert_eq!(
            Value::Array(failure.detail.clone()),
            json!(["cat", "code", ["X/123", "msg"]])
        );
        assert_eq!(failure.message_class(), Some("X/123"));
        assert_eq!(failure.message(), Some("msg"));
    }

    #[test]
    fn any_other_marker_is_failure() {
        let result = decode("XXXX[]").unwrap();
        assert!(matches!(result, RpcResult::Failure(f) if f.kind == "XXXX" && f.detail.is_empty()));
    }

    #[test]
    fn short_body_is_truncated() {
        assert!(matches!(decode("//O"), Err(DecodeError::Truncated { .. })));
        assert!(matches!(decode(""), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn marker_splitting_a_multibyte_char_is_truncated() {
        assert!(matches!(decode("//Oé[]"), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn invalid_json_is_decode_error() {
        assert!(matches!(
            decode("//OK<html>"),
            Err(DecodeError::InvalidJson { .. })
        ));
        assert!(matches!(decode("//OK"), Err(DecodeError::InvalidJson { .. })));
    }

    #[test]
    fn non_array_is_decode_error() {
        assert!(matches!(
            decode(r#"//OK{"a":1}"#),
            Err(DecodeError::NotAnArray { .. })
        ));
    }

    #[test]
    fn failure_display_names_the_exception() {
        let failure = RpcFailure {
            kind: "EX".to_string(),
            detail: vec![json!(2), json!(1), json!(["pkg.Boom/1", "it broke"])],
        };
        let shown = failure.to_string();
        assert!(shown.starts_with("[EX] pkg.Boom/1: it broke "));
    }
}
