use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file received from a client, ready to be handed to the store.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub data: Bytes,
    /// File name as sent by the client.
    pub file_name: String,
    /// Extension including the leading dot, e.g. `.png`.
    pub extension: String,
    pub size: u64,
    /// Caller-chosen stem for the stored object.
    pub name_param: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentLink {
    pub image_url: String,
}
