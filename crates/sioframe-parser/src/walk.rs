//! Buffer attach/detach traversal.
//!
//! Both walks visit the tree depth-first: arrays by index, objects in
//! insertion order. The encoder numbers attachments in that order and
//! the decoder resolves placeholders in that order, so the two agree on
//! which BINARY frame belongs to which buffer.

use bytes::Bytes;

use crate::buffer::Buffer;
use crate::error::{CodecError, Result};
use crate::value::{Map, Value};

/// Output of [`attach`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attached {
    /// Argument tree with every buffer replaced by a placeholder.
    pub values: Vec<Value>,
    /// Buffer payloads, indexed by placeholder number.
    pub buffers: Vec<Bytes>,
}

/// Pull every buffer out of `args`.
///
/// The caller's tree is left untouched; the returned tree holds
/// placeholders numbered from 0.
pub fn attach(args: &[Value]) -> Attached {
    let mut buffers = Vec::new();
    let values = args
        .iter()
        .map(|value| attach_value(value, &mut buffers))
        .collect();
    Attached { values, buffers }
}

fn attach_value(value: &Value, buffers: &mut Vec<Bytes>) -> Value {
    match value {
        Value::Binary(buffer) => {
            let num = buffers.len() as u64;
            buffers.push(buffer.data().clone());
            Value::Binary(Buffer::placeholder(num))
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| attach_value(item, buffers))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key, attach_value(item, buffers)))
                .collect::<Map>(),
        ),
        other => other.clone(),
    }
}

/// Copy of `args` with every buffer in its inline JSON form.
pub fn inline(args: &[Value]) -> Vec<Value> {
    args.iter().map(inline_value).collect()
}

fn inline_value(value: &Value) -> Value {
    match value {
        Value::Binary(buffer) => Value::Binary(buffer.to_inline()),
        Value::Array(items) => Value::Array(items.iter().map(inline_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key, inline_value(item)))
                .collect::<Map>(),
        ),
        other => other.clone(),
    }
}

/// Replace every placeholder in `values` with its payload from `buffers`.
///
/// Inline buffers are left alone.
pub fn detach(values: &mut [Value], buffers: &[Bytes]) -> Result<()> {
    for value in values {
        detach_value(value, buffers)?;
    }
    Ok(())
}

fn detach_value(value: &mut Value, buffers: &[Bytes]) -> Result<()> {
    match value {
        Value::Binary(buffer) => {
            if let Some(num) = buffer.attachment() {
                let payload = usize::try_from(num)
                    .ok()
                    .and_then(|index| buffers.get(index))
                    .ok_or(CodecError::AttachmentOutOfRange {
                        num,
                        count: buffers.len(),
                    })?;
                *buffer = Buffer::new(payload.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                detach_value(item, buffers)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                detach_value(item, buffers)?;
            }
        }
        _ => {}
    }
    Ok(())
}
