//! Relay-style global object identifiers and pagination cursors.
//!
//! A global ID is base64("TypeName:uuid"); a cursor is base64("cursor:offset").
//! Both use the URL-safe alphabet without padding.

use async_graphql::{ID, Interface};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

use super::types::{Category, Post, User};

/// Relay Node interface - anything refetchable by global ID.
#[derive(Interface)]
#[graphql(field(name = "id", ty = "ID"))]
pub enum Node {
    User(User),
    Category(Category),
    Post(Post),
}

/// Encode an entity's global ID.
pub fn encode_global_id(type_name: &str, id: Uuid) -> ID {
    ID(URL_SAFE_NO_PAD.encode(format!("{type_name}:{id}")))
}

/// Decode a global ID into its type name and local UUID.
pub fn decode_global_id(value: &str) -> Option<(String, Uuid)> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    let (type_name, raw_id) = decoded.split_once(':')?;
    let id = Uuid::parse_str(raw_id).ok()?;
    Some((type_name.to_string(), id))
}

/// Parse an ID argument that references an entity of `expected` type.
/// Accepts a global ID or a bare UUID.
pub fn parse_id(value: &ID, expected: &str) -> Option<Uuid> {
    if let Some((type_name, id)) = decode_global_id(value.as_str()) {
        return (type_name == expected).then_some(id);
    }
    Uuid::parse_str(value.as_str()).ok()
}

/// Encode a pagination cursor for the row at `offset`.
pub fn encode_cursor(offset: u64) -> String {
    URL_SAFE_NO_PAD.encode(format!("cursor:{offset}"))
}

/// Decode a pagination cursor back to its row offset.
pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let bytes = URL_SAFE_NO_PAD.decode(cursor).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    decoded.strip_prefix("cursor:")?.parse().ok()
}
