//! Stored files, as described by both the API and the storage service.

use serde::{Deserialize, Serialize};

use crate::{codec::Attributes, envelope::ResourceObject};

use super::{null_as_default, OsfTime};

/// Identifier of a stored file.
pub type FileID = String;

/// Action links of a file, following the Waterbutler convention.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FileLinks {
    pub new_folder: Option<String>,
    #[serde(rename = "move")]
    pub move_link: Option<String>,
    pub upload: Option<String>,
    pub download: Option<String>,
    pub delete: Option<String>,
}

/// A file record. The storage service answers uploads with only a subset of
/// these attributes, so every field falls back to its default.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct File {
    /// Filled from the envelope id after decoding.
    #[serde(skip_deserializing)]
    pub id: FileID,

    #[serde(deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub last_touched: Option<OsfTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub materialized_path: String,
    pub date_modified: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub current_version: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub delete_allowed: bool,
    pub date_created: Option<OsfTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_user_can_comment: bool,
    pub guid: Option<String>,
    pub size: Option<u64>,

    /// Action links, folded in from the envelope.
    #[serde(skip_deserializing)]
    pub links: Option<FileLinks>,
}

impl Attributes for File {
    fn primary_key_mut(&mut self) -> Option<&mut String> {
        Some(&mut self.id)
    }
}

pub(crate) fn build_file(object: ResourceObject<File, FileLinks>) -> File {
    let mut file = object.attributes;
    file.links = object.links;
    file
}
