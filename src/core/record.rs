//! Remote record state and its typed link set
//!
//! Every remote operation answers with a fresh JSON document. A [`Record`]
//! wraps that document together with its parsed identifier and links, so
//! the next operation always follows the links of the latest state.

use crate::core::error::LoaderError;
use serde::Deserialize;
use serde_json::Value;

/// Hyperlinks the service attaches to a package or resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkSet {
    #[serde(rename = "self")]
    pub self_link: Option<String>,
    pub files: Option<String>,
    pub publish: Option<String>,
    pub reserve_doi: Option<String>,
    pub context_associate: Option<String>,
    pub resources: Option<String>,
}

/// Name of a link in a [`LinkSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    SelfLink,
    Files,
    Publish,
    ReserveDoi,
    ContextAssociate,
    Resources,
}

impl Link {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfLink => "self",
            Self::Files => "files",
            Self::Publish => "publish",
            Self::ReserveDoi => "reserve_doi",
            Self::ContextAssociate => "context_associate",
            Self::Resources => "resources",
        }
    }
}

impl LinkSet {
    pub fn get(&self, link: Link) -> Option<&str> {
        let value = match link {
            Link::SelfLink => &self.self_link,
            Link::Files => &self.files,
            Link::Publish => &self.publish,
            Link::ReserveDoi => &self.reserve_doi,
            Link::ContextAssociate => &self.context_associate,
            Link::Resources => &self.resources,
        };
        value.as_deref().filter(|url| !url.is_empty())
    }

    /// Link required by an operation, or `MissingLink`
    pub fn require(&self, link: Link) -> Result<&str, LoaderError> {
        self.get(link).ok_or(LoaderError::MissingLink {
            link: link.as_str(),
        })
    }
}

/// Latest known remote state of a package or resource
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: Option<String>,
    links: LinkSet,
    document: Value,
}

impl Record {
    /// Wrap a service response, parsing its `id` and `links`
    pub fn from_document(document: Value) -> Result<Self, LoaderError> {
        let object = document
            .as_object()
            .ok_or_else(|| LoaderError::MalformedRecord {
                message: format!("expected a JSON object, got `{}`", document),
            })?;

        // Identifiers are strings on the service, but accept numbers too.
        let id = match object.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        let links = match object.get("links") {
            None | Some(Value::Null) => LinkSet::default(),
            Some(links) => serde_json::from_value(links.clone()).map_err(|e| {
                LoaderError::MalformedRecord {
                    message: format!("invalid `links`: {}", e),
                }
            })?,
        };

        Ok(Self {
            id,
            links,
            document,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn require_id(&self) -> Result<&str, LoaderError> {
        self.id().ok_or_else(|| LoaderError::MalformedRecord {
            message: "record has no `id`".to_string(),
        })
    }

    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_document_parses_id_and_links() {
        let record = Record::from_document(json!({
            "id": "abcd-1234",
            "links": {
                "self": "https://hub.example/api/packages/abcd-1234/draft",
                "files": "https://hub.example/api/packages/abcd-1234/draft/files",
                "reserve_doi": "https://hub.example/api/packages/abcd-1234/draft/pids/doi",
                "html": "https://hub.example/uploads/abcd-1234"
            }
        }))
        .unwrap();

        assert_eq!(record.id(), Some("abcd-1234"));
        assert_eq!(
            record.links().get(Link::SelfLink),
            Some("https://hub.example/api/packages/abcd-1234/draft")
        );
        assert!(record.links().get(Link::ReserveDoi).is_some());
        assert_eq!(record.links().get(Link::Publish), None);
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let record = Record::from_document(json!({"id": 42})).unwrap();
        assert_eq!(record.require_id().unwrap(), "42");
    }

    #[test]
    fn test_require_missing_link() {
        let record = Record::from_document(json!({"id": "x", "links": {"publish": ""}})).unwrap();

        let error = record.links().require(Link::Publish).unwrap_err();
        assert!(matches!(error, LoaderError::MissingLink { link: "publish" }));
    }

    #[test]
    fn test_record_without_links() {
        let record = Record::from_document(json!({"id": "x"})).unwrap();
        assert_eq!(record.links(), &LinkSet::default());
    }

    #[test]
    fn test_non_object_document_is_malformed() {
        let error = Record::from_document(json!([1, 2, 3])).unwrap_err();
        assert_eq!(error.code(), "MALFORMED_RECORD");

        let error = Record::from_document(json!({"links": "nope"})).unwrap_err();
        assert_eq!(error.code(), "MALFORMED_RECORD");
    }

    #[test]
    fn test_missing_id() {
        let record = Record::from_document(json!({})).unwrap();
        assert!(record.require_id().is_err());
    }
}
