//! VMess share links.
//!
//! A share link is `vmess://` followed by the standard, padded base64 of the
//! server's compact JSON form (see the `Serialize` impl on [`VmessServer`]).

use std::io::Write;
use std::string::FromUtf8Error;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::config::schema::VmessServer;

/// Scheme prefix of every share link.
pub const SHARE_LINK_SCHEME: &str = "vmess://";

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to serialize server: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write share link: {0}")]
    Io(#[from] std::io::Error),

    #[error("share link is not valid UTF-8: {0}")]
    NotUtf8(#[from] FromUtf8Error),

    #[error("not a vmess share link")]
    MissingScheme,

    #[error("invalid share link payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl VmessServer {
    /// Write this server's share link to `w`.
    ///
    /// The JSON payload is encoded in full before anything reaches `w`, so a
    /// serialization failure writes nothing.
    pub fn write_share_link<W: Write>(&self, w: &mut W) -> Result<(), LinkError> {
        let payload = STANDARD.encode(serde_json::to_vec(self)?);
        w.write_all(SHARE_LINK_SCHEME.as_bytes())?;
        w.write_all(payload.as_bytes())?;
        Ok(())
    }

    /// This server's share link as a string. Same bytes as [`Self::write_share_link`].
    pub fn share_link(&self) -> Result<String, LinkError> {
        let mut buf = Vec::new();
        self.write_share_link(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Decode a share link back into its JSON object.
pub fn decode_share_link(link: &str) -> Result<serde_json::Value, LinkError> {
    let payload = link
        .trim()
        .strip_prefix(SHARE_LINK_SCHEME)
        .ok_or(LinkError::MissingScheme)?;
    let json = STANDARD.decode(payload)?;
    Ok(serde_json::from_slice(&json)?)
}
