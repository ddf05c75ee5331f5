//! Type and method descriptor grammar
//!
//! Descriptors use a compact single-pass grammar over dotted type names:
//! `I J F D Z V` for primitives, `Ldemo.Vector;` for object types, `[`
//! prefixes for arrays, and `(IJ)V` for methods.

use thiserror::Error;

/// Descriptor parsing errors
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor is not well formed
    #[error("Malformed descriptor {0:?}")]
    Malformed(String),
}

/// Parse the parameter descriptors out of a method descriptor
pub fn param_descriptors(method_desc: &str) -> Result<Vec<String>, DescriptorError> {
    let inner = method_desc
        .strip_prefix('(')
        .and_then(|rest| rest.split_once(')'))
        .ok_or_else(|| DescriptorError::Malformed(method_desc.to_string()))?
        .0;

    let mut params = Vec::new();
    let mut i = 0;
    while i < inner.len() {
        let end = next_type_end(inner, i)
            .ok_or_else(|| DescriptorError::Malformed(method_desc.to_string()))?;
        params.push(inner[i..end].to_string());
        i = end;
    }
    Ok(params)
}

/// Count the parameters of a method descriptor
pub fn param_count(method_desc: &str) -> Result<usize, DescriptorError> {
    Ok(param_descriptors(method_desc)?.len())
}

/// Parse the return descriptor of a method descriptor
pub fn return_descriptor(method_desc: &str) -> Result<String, DescriptorError> {
    let ret = method_desc
        .split_once(')')
        .ok_or_else(|| DescriptorError::Malformed(method_desc.to_string()))?
        .1;
    if next_type_end(ret, 0) != Some(ret.len()) {
        return Err(DescriptorError::Malformed(method_desc.to_string()));
    }
    Ok(ret.to_string())
}

/// Byte offset one past the single type descriptor starting at `start`
fn next_type_end(desc: &str, start: usize) -> Option<usize> {
    let bytes = desc.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i] == b'[' {
        i += 1;
    }
    match bytes.get(i)? {
        b'B' | b'C' | b'S' | b'I' | b'J' | b'F' | b'D' | b'Z' | b'V' => Some(i + 1),
        b'L' => {
            let semi = desc[i..].find(';')?;
            Some(i + semi + 1)
        }
        _ => None,
    }
}
