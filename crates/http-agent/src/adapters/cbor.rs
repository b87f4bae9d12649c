//! # CBOR Codec
//!
//! Wire encoding of envelopes and decoding of replica replies.
//!
//! Envelopes are written as a self-describing CBOR map (tag 55799). Byte
//! fields are CBOR byte strings, numbers unsigned integers, and absent
//! optional fields are omitted rather than encoded as null.

use ciborium::value::{Integer, Value};

use crate::domain::{
    AgentError, Certificate, Envelope, HashTree, HashValue, QueryResponse, ReadStateResponse,
};

/// CBOR self-describe tag.
pub const SELF_DESCRIBE_TAG: u64 = 55799;

/// Encode an envelope for transmission.
pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>, AgentError> {
    let content = Value::Map(
        envelope
            .content
            .fields()
            .iter()
            .map(|(name, value)| (Value::Text(name.to_string()), to_cbor(value)))
            .collect(),
    );

    let mut fields = vec![(Value::Text("content".to_string()), content)];
    if let Some(public_key) = &envelope.sender_pubkey {
        fields.push((
            Value::Text("sender_pubkey".to_string()),
            Value::Bytes(public_key.clone()),
        ));
    }
    if let Some(signature) = &envelope.sender_sig {
        fields.push((
            Value::Text("sender_sig".to_string()),
            Value::Bytes(signature.clone()),
        ));
    }
    if let Some(delegations) = &envelope.sender_delegation {
        let chain = delegations
            .iter()
            .map(|signed| to_cbor(&HashValue::Map(signed.fields())))
            .collect();
        fields.push((Value::Text("sender_delegation".to_string()), Value::Array(chain)));
    }

    let tagged = Value::Tag(SELF_DESCRIBE_TAG, Box::new(Value::Map(fields)));
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&tagged, &mut bytes)
        .map_err(|e| AgentError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn to_cbor(value: &HashValue) -> Value {
    match value {
        HashValue::Bytes(bytes) => Value::Bytes(bytes.clone()),
        HashValue::Text(text) => Value::Text(text.clone()),
        HashValue::Nat(n) => Value::Integer(Integer::from(*n)),
        HashValue::Array(items) => Value::Array(items.iter().map(to_cbor).collect()),
        HashValue::Map(fields) => Value::Map(
            fields
                .iter()
                .map(|(name, value)| (Value::Text(name.clone()), to_cbor(value)))
                .collect(),
        ),
    }
}

/// Decode any CBOR body, removing a leading self-describe tag.
pub fn decode_value(bytes: &[u8]) -> Result<Value, AgentError> {
    let value: Value =
        ciborium::de::from_reader(bytes).map_err(|e| AgentError::Decode(e.to_string()))?;
    Ok(match value {
        Value::Tag(SELF_DESCRIBE_TAG, inner) => *inner,
        other => other,
    })
}

/// Look up a text key in a CBOR map.
pub fn map_get<'a>(map: &'a [(Value, Value)], key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.as_text() == Some(key))
        .map(|(_, v)| v)
}

/// Decode a query reply.
pub fn decode_query_response(bytes: &[u8]) -> Result<QueryResponse, AgentError> {
    let value = decode_value(bytes)?;
    let map = as_map(&value, "query response")?;

    match text_field(map, "status")? {
        "replied" => {
            let reply = map_get(map, "reply")
                .and_then(Value::as_map)
                .ok_or_else(|| missing("reply"))?;
            Ok(QueryResponse::Replied {
                arg: bytes_field(reply, "arg")?.to_vec(),
            })
        }
        "rejected" => Ok(QueryResponse::Rejected {
            reject_code: nat_field(map, "reject_code")?,
            reject_message: text_field(map, "reject_message")?.to_string(),
            error_code: map_get(map, "error_code")
                .and_then(Value::as_text)
                .map(str::to_string),
        }),
        other => Err(AgentError::Decode(format!("unknown query status '{}'", other))),
    }
}

/// Decode a read-state reply.
pub fn decode_read_state_response(bytes: &[u8]) -> Result<ReadStateResponse, AgentError> {
    let value = decode_value(bytes)?;
    let map = as_map(&value, "read_state response")?;
    Ok(ReadStateResponse {
        certificate: bytes_field(map, "certificate")?.to_vec(),
    })
}

/// Decode a certificate.
pub fn decode_certificate(bytes: &[u8]) -> Result<Certificate, AgentError> {
    let value = decode_value(bytes)?;
    let map = as_map(&value, "certificate")?;
    let tree = map_get(map, "tree").ok_or_else(|| missing("tree"))?;

    Ok(Certificate {
        tree: decode_hash_tree(tree)?,
        signature: bytes_field(map, "signature")?.to_vec(),
    })
}

/// Decode a hash tree node: `[0]`, `[1, l, r]`, `[2, label, t]`, `[3, leaf]`, `[4, hash]`.
pub fn decode_hash_tree(value: &Value) -> Result<HashTree, AgentError> {
    let items = value
        .as_array()
        .ok_or_else(|| AgentError::Decode("hash tree node is not an array".to_string()))?;
    let tag = items
        .first()
        .and_then(Value::as_integer)
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| AgentError::Decode("hash tree node without tag".to_string()))?;

    let node = match (tag, items.len()) {
        (0, 1) => HashTree::Empty,
        (1, 3) => HashTree::Fork(
            Box::new(decode_hash_tree(&items[1])?),
            Box::new(decode_hash_tree(&items[2])?),
        ),
        (2, 3) => HashTree::Labeled(node_bytes(&items[1])?, Box::new(decode_hash_tree(&items[2])?)),
        (3, 2) => HashTree::Leaf(node_bytes(&items[1])?),
        (4, 2) => {
            let hash = node_bytes(&items[1])?;
            let hash: [u8; 32] = hash
                .try_into()
                .map_err(|_| AgentError::Decode("pruned hash is not 32 bytes".to_string()))?;
            HashTree::Pruned(hash)
        }
        _ => {
            return Err(AgentError::Decode(format!(
                "malformed hash tree node (tag {}, {} items)",
                tag,
                items.len()
            )))
        }
    };
    Ok(node)
}

fn node_bytes(value: &Value) -> Result<Vec<u8>, AgentError> {
    value
        .as_bytes()
        .cloned()
        .ok_or_else(|| AgentError::Decode("hash tree field is not bytes".to_string()))
}

fn as_map<'a>(value: &'a Value, what: &str) -> Result<&'a [(Value, Value)], AgentError> {
    value
        .as_map()
        .map(Vec::as_slice)
        .ok_or_else(|| AgentError::Decode(format!("{} is not a map", what)))
}

fn missing(field: &str) -> AgentError {
    AgentError::Decode(format!("missing or mistyped field '{}'", field))
}

fn text_field<'a>(map: &'a [(Value, Value)], key: &str) -> Result<&'a str, AgentError> {
    map_get(map, key)
        .and_then(Value::as_text)
        .ok_or_else(|| missing(key))
}

fn bytes_field<'a>(map: &'a [(Value, Value)], key: &str) -> Result<&'a [u8], AgentError> {
    map_get(map, key)
        .and_then(Value::as_bytes)
        .map(Vec::as_slice)
        .ok_or_else(|| missing(key))
}

fn nat_field(map: &[(Value, Value)], key: &str) -> Result<u64, AgentError> {
    map_get(map, key)
        .and_then(Value::as_integer)
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| missing(key))
}
