//! Preprint providers (OSF Preprints, PsyArXiv, SocArXiv, ...).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{codec::Attributes, envelope::ResourceObject};

use super::null_as_default;

/// Short name of a provider (e.g. `"osf"`, `"psyarxiv"`).
pub type PreprintProviderID = String;

/// One `subjects_acceptable` entry. On the wire this is a two-element array
/// `[[taxonomy ids...], include_all_children]`, not an object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "(Vec<String>, bool)", into = "(Vec<String>, bool)")]
pub struct AcceptableSubject {
    pub taxonomy_ids: Vec<String>,
    pub include_all_children: bool,
}

impl From<(Vec<String>, bool)> for AcceptableSubject {
    fn from((taxonomy_ids, include_all_children): (Vec<String>, bool)) -> Self {
        Self {
            taxonomy_ids,
            include_all_children,
        }
    }
}

impl From<AcceptableSubject> for (Vec<String>, bool) {
    fn from(subject: AcceptableSubject) -> Self {
        (subject.taxonomy_ids, subject.include_all_children)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PreprintProviderLinks {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub preprints: Option<String>,
    pub external_url: Option<String>,
}

/// A preprint provider as returned by `/preprint_providers`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct PreprintProvider {
    /// Filled from the envelope id after decoding.
    #[serde(skip_deserializing)]
    pub id: PreprintProviderID,

    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub advisory_board: Option<String>,
    pub example: Option<String>,
    pub domain: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub domain_redirect_enabled: bool,
    pub footer_links: Option<String>,
    pub email_support: Option<String>,
    pub facebook_app_id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub allow_submissions: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub allow_commenting: bool,
    pub assets: Option<Map<String, Value>>,
    pub share_source: Option<String>,
    pub share_publish_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub permissions: Vec<String>,
    pub preprint_word: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub additional_providers: Vec<String>,
    pub reviews_workflow: Option<String>,
    pub reviews_comment_private: Option<bool>,
    pub reviews_comment_anonymous: Option<bool>,
    pub header_text: Option<String>,
    pub banner_path: Option<String>,
    pub logo_path: Option<String>,
    pub email_contact: Option<String>,
    pub social_twitter: Option<String>,
    pub social_facebook: Option<String>,
    #[serde(rename = "social-instagram")]
    pub social_instagram: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub subjects_acceptable: Vec<AcceptableSubject>,

    /// Resource links, folded in from the envelope.
    #[serde(skip_deserializing)]
    pub links: Option<PreprintProviderLinks>,
}

impl Attributes for PreprintProvider {
    fn primary_key_mut(&mut self) -> Option<&mut String> {
        Some(&mut self.id)
    }
}

pub(crate) fn build_preprint_provider(
    object: ResourceObject<PreprintProvider, PreprintProviderLinks>,
) -> PreprintProvider {
    let mut provider = object.attributes;
    provider.links = object.links;
    provider
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn acceptable_subject_decodes_from_tuple() {
        let subject: AcceptableSubject =
            serde_json::from_value(json!([["id1", "id2"], true])).unwrap();
        assert_eq!(
            subject,
            AcceptableSubject {
                taxonomy_ids: vec!["id1".into(), "id2".into()],
                include_all_children: true,
            }
        );
        assert_eq!(
            serde_json::to_value(&subject).unwrap(),
            json!([["id1", "id2"], true])
        );
    }

    #[test]
    fn acceptable_subject_rejects_wrong_length() {
        assert!(serde_json::from_value::<AcceptableSubject>(json!([["id1"]])).is_err());
        assert!(serde_json::from_value::<AcceptableSubject>(json!([["id1"], true, 3])).is_err());
        assert!(serde_json::from_str::<AcceptableSubject>(r#"[["id1"], true, 3]"#).is_err());
        assert!(serde_json::from_value::<AcceptableSubject>(json!([])).is_err());
    }

    #[test]
    fn acceptable_subject_rejects_wrong_element_types() {
        assert!(serde_json::from_value::<AcceptableSubject>(json!([["id1", 2], true])).is_err());
        assert!(serde_json::from_value::<AcceptableSubject>(json!([["id1"], "yes"])).is_err());
        assert!(serde_json::from_value::<AcceptableSubject>(json!(["id1", true])).is_err());
        assert!(serde_json::from_value::<AcceptableSubject>(
            json!({"taxonomy_ids": ["id1"], "include_all_children": true})
        )
        .is_err());
    }

    #[test]
    fn provider_decodes_subjects_and_instagram() {
        let provider: PreprintProvider = serde_json::from_value(json!({
            "name": "OSF Preprints",
            "social-instagram": "osf",
            "subjects_acceptable": [[["a", "b"], false], [["c"], true]],
            "assets": {"square_color_no_transparent": "https://example.org/a.png"}
        }))
        .unwrap();
        assert_eq!(provider.social_instagram.as_deref(), Some("osf"));
        assert_eq!(provider.subjects_acceptable.len(), 2);
        assert!(provider.subjects_acceptable[1].include_all_children);
        assert!(provider.assets.unwrap().contains_key("square_color_no_transparent"));
    }
}
