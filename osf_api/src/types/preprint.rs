//! Preprint resources: the read-side record and the write-side input.

use serde::{Deserialize, Serialize};

use crate::{codec::Attributes, envelope::ResourceObject};

use super::{null_as_default, OsfTime};

/// Short alphanumeric GUID of a preprint (e.g. `"xfdsr"`).
pub type PreprintID = String;

/// Answer to the "do you have data links / preregistration links" questions.
/// An unanswered question is `None` on the containing field.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkAvailability {
    Available,
    No,
    NotApplicable,
}

impl std::fmt::Display for LinkAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                LinkAvailability::Available => "available",
                LinkAvailability::No => "no",
                LinkAvailability::NotApplicable => "not_applicable",
            }
        )
    }
}

impl std::str::FromStr for LinkAvailability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(LinkAvailability::Available),
            "no" => Ok(LinkAvailability::No),
            "not_applicable" | "not-applicable" => Ok(LinkAvailability::NotApplicable),
            other => Err(format!(
                "unknown link availability {:?} (expected available, no or not_applicable)",
                other
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LicenseRecord {
    #[serde(default)]
    pub copyright_holders: Vec<String>,
    #[serde(default)]
    pub year: String,
}

/// A taxonomy subject attached to a preprint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Subject {
    pub id: String,
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PreprintLinks {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub html: Option<String>,
    pub preprint_doi: Option<String>,
}

/// A preprint as returned by `/preprints`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Preprint {
    /// Filled from the envelope id after decoding.
    #[serde(skip_deserializing)]
    pub id: PreprintID,

    pub date_created: Option<OsfTime>,
    pub date_modified: Option<OsfTime>,
    pub date_published: Option<OsfTime>,
    pub original_publication_date: Option<OsfTime>,
    pub doi: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_published: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_preprint_orphan: bool,
    pub license_record: Option<LicenseRecord>,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    pub preprint_doi_created: Option<OsfTime>,
    pub date_withdrawn: Option<OsfTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub public: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub reviews_state: String,
    pub date_last_transitioned: Option<OsfTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub has_coi: bool,
    pub conflict_of_interest_statement: Option<String>,
    /// Each inner list is a path from a top-level subject down the taxonomy.
    #[serde(deserialize_with = "null_as_default")]
    pub subjects: Vec<Vec<Subject>>,
    pub has_data_links: Option<LinkAvailability>,
    pub why_no_data: Option<String>,
    pub data_links: Option<Vec<String>>,
    pub has_prereg_links: Option<LinkAvailability>,
    pub why_no_prereg: Option<String>,
    pub prereg_links: Option<Vec<String>>,
    pub prereg_link_info: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub current_user_permissions: Vec<String>,

    /// Resource links, folded in from the envelope.
    #[serde(skip_deserializing)]
    pub links: Option<PreprintLinks>,
}

impl Attributes for Preprint {
    fn primary_key_mut(&mut self) -> Option<&mut String> {
        Some(&mut self.id)
    }
}

pub(crate) fn build_preprint(object: ResourceObject<Preprint, PreprintLinks>) -> Preprint {
    let mut preprint = object.attributes;
    preprint.links = object.links;
    preprint
}

/// Attributes sent when creating or updating a preprint. Unset fields are
/// left off the wire so an update only touches what was set.
#[derive(Serialize, Clone, Debug, Default)]
pub struct PreprintInput {
    /// Provider the preprint is submitted to. Sent as the `provider`
    /// relationship on creation, never as an attribute.
    #[serde(skip)]
    pub provider_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    /// Subject id paths, e.g. `[["<top>", "<child>", "<grandchild>"]]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_publication_date: Option<OsfTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_record: Option<LicenseRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprint_doi_created: Option<OsfTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_coi: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_of_interest_statement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_data_links: Option<LinkAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_no_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_prereg_links: Option<LinkAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_no_prereg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prereg_links: Option<Vec<String>>,
}

impl PreprintInput {
    /// Starts an input for a preprint submitted to `provider_id`.
    pub fn for_provider(provider_id: &str) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.to_string());
        self
    }
    pub fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags
            .get_or_insert_with(Vec::new)
            .extend_from_slice(tags);
        self
    }

    /// Adds one subject path, top-level subject first.
    pub fn with_subject_path(mut self, path: &[String]) -> Self {
        self.subjects
            .get_or_insert_with(Vec::new)
            .push(path.to_vec());
        self
    }

    pub fn with_original_publication_date(mut self, date: OsfTime) -> Self {
        self.original_publication_date = Some(date);
        self
    }

    pub fn with_doi(mut self, doi: &str) -> Self {
        self.doi = Some(doi.to_string());
        self
    }

    pub fn with_coi(mut self, has_coi: bool) -> Self {
        self.has_coi = Some(has_coi);
        self
    }

    pub fn with_data_links(mut self, availability: LinkAvailability) -> Self {
        self.has_data_links = Some(availability);
        self
    }

    pub fn with_prereg_links(mut self, availability: LinkAvailability) -> Self {
        self.has_prereg_links = Some(availability);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn input_leaves_unset_fields_off_the_wire() {
        let input = PreprintInput::for_provider("osf")
            .with_title("Protein measurement")
            .with_tag("protein")
            .with_data_links(LinkAvailability::NotApplicable)
            .with_coi(false);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "title": "Protein measurement",
                "tags": ["protein"],
                "has_coi": false,
                "has_data_links": "not_applicable"
            })
        );
    }

    #[test]
    fn link_availability_parses_all_variants() {
        for (raw, expected) in [
            ("available", LinkAvailability::Available),
            ("no", LinkAvailability::No),
            ("not_applicable", LinkAvailability::NotApplicable),
        ] {
            assert_eq!(raw.parse::<LinkAvailability>().unwrap(), expected);
            assert_eq!(expected.to_string(), raw);
            assert_eq!(
                serde_json::from_value::<LinkAvailability>(json!(raw)).unwrap(),
                expected
            );
        }
        assert!("maybe".parse::<LinkAvailability>().is_err());
    }

    #[test]
    fn preprint_tolerates_null_optional_members() {
        let preprint: Preprint = serde_json::from_value(json!({
            "title": "t",
            "has_data_links": null,
            "data_links": null,
            "date_published": "2022-01-02T03:04:05.678901",
            "subjects": [[{"id": "a", "text": "Life Sciences"}, {"id": "b", "text": "Biochemistry"}]]
        }))
        .unwrap();
        assert!(preprint.has_data_links.is_none());
        assert!(preprint.data_links.is_none());
        assert!(preprint.date_published.is_some());
        assert_eq!(preprint.subjects[0][1].text, "Biochemistry");
        assert!(preprint.id.is_empty());
    }
}
