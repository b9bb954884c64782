use bytes::Bytes;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::{Map, Value};

const PLACEHOLDER_KEY: &str = "_placeholder";
const NUM_KEY: &str = "num";
const TYPE_KEY: &str = "type";
const DATA_KEY: &str = "data";
const BUFFER_TYPE: &str = "Buffer";

/// An opaque byte payload that can sit anywhere in an argument tree.
///
/// Besides its bytes a buffer carries wire state: either it is rendered
/// inline as `{"type":"Buffer","data":[..]}`, or it stands in for BINARY
/// attachment `N` as `{"_placeholder":true,"num":N}`. Buffers built by
/// callers are always inline; the encoder produces placeholder copies and
/// the decoder swaps placeholders back for real bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Bytes,
    attachment: Option<u64>,
}

impl Buffer {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            attachment: None,
        }
    }

    /// A stand-in for attachment `num` whose bytes arrive later.
    pub(crate) fn placeholder(num: u64) -> Self {
        Self {
            data: Bytes::new(),
            attachment: Some(num),
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Attachment index when this buffer is a placeholder.
    pub fn attachment(&self) -> Option<u64> {
        self.attachment
    }

    pub fn is_placeholder(&self) -> bool {
        self.attachment.is_some()
    }

    /// Same bytes, rendered inline.
    pub(crate) fn to_inline(&self) -> Self {
        Self::new(self.data.clone())
    }

    /// Recognise either JSON form of a buffer among an object's fields.
    pub(crate) fn from_fields(map: &Map) -> Option<Self> {
        if map.len() != 2 {
            return None;
        }

        if matches!(map.get(PLACEHOLDER_KEY), Some(Value::Bool(true))) {
            return map.get(NUM_KEY).and_then(Value::as_u64).map(Self::placeholder);
        }

        if map.get(TYPE_KEY).and_then(Value::as_str) != Some(BUFFER_TYPE) {
            return None;
        }
        let items = map.get(DATA_KEY)?.as_array()?;
        let mut data = Vec::with_capacity(items.len());
        for item in items {
            data.push(u8::try_from(item.as_u64()?).ok()?);
        }
        Some(Self::new(data))
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self.attachment {
            Some(num) => serde_json::json!({ PLACEHOLDER_KEY: true, NUM_KEY: num }),
            None => serde_json::json!({ TYPE_KEY: BUFFER_TYPE, DATA_KEY: &self.data[..] }),
        }
    }
}

impl From<Bytes> for Buffer {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&'static [u8]> for Buffer {
    fn from(data: &'static [u8]) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl Serialize for Buffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self.attachment {
            Some(num) => {
                map.serialize_entry(PLACEHOLDER_KEY, &true)?;
                map.serialize_entry(NUM_KEY, &num)?;
            }
            None => {
                map.serialize_entry(TYPE_KEY, BUFFER_TYPE)?;
                map.serialize_entry(DATA_KEY, &self.data[..])?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Buffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Binary(buffer) => Ok(buffer),
            _ => Err(de::Error::custom(
                "expected a Buffer object or attachment placeholder",
            )),
        }
    }
}
