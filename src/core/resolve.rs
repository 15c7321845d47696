//! Reference milestone lookup and per-spec field resolution.

use crate::domain::model::{FieldValue, MilestoneConfig, RemoteMilestone, RepoTarget};
use crate::domain::ports::MilestoneHost;
use crate::utils::error::{Result, SyncError};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static REFERENCE_URL_RE: OnceLock<Regex> = OnceLock::new();

fn reference_url_re() -> &'static Regex {
    REFERENCE_URL_RE.get_or_init(|| {
        Regex::new(r"^https://[^/]+/([^/]+)/([^/]+)/milestone/(\d+)$")
            .expect("reference URL pattern is valid")
    })
}

/// A fully-qualified milestone URL, `https://<host>/<owner>/<repo>/milestone/<number>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceUrl {
    pub repo: RepoTarget,
    pub number: u64,
}

impl ReferenceUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let captures =
            reference_url_re()
                .captures(url)
                .ok_or_else(|| SyncError::InvalidReferenceUrl {
                    url: url.to_string(),
                })?;
        let number = captures[3]
            .parse()
            .map_err(|_| SyncError::InvalidReferenceUrl {
                url: url.to_string(),
            })?;
        Ok(Self {
            repo: RepoTarget {
                owner: captures[1].to_string(),
                repo: captures[2].to_string(),
            },
            number,
        })
    }
}

/// Outcome of a reference milestone lookup. `NotFound` means the remote
/// confirmed the milestone is absent; `Failed` means the lookup itself failed.
/// Callers apply different fallback policy to the two.
#[derive(Debug, Clone)]
pub enum RefLookup {
    Found(RemoteMilestone),
    NotFound,
    Failed(String),
}

/// Fetches reference milestones through the host port, caching Found/NotFound
/// results per URL for the duration of a run. Failed lookups are not cached.
pub struct ReferenceResolver<'a, H: MilestoneHost> {
    host: &'a H,
    cache: HashMap<String, RefLookup>,
}

impl<'a, H: MilestoneHost> ReferenceResolver<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self {
            host,
            cache: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, url: &str) -> Result<RefLookup> {
        if let Some(hit) = self.cache.get(url) {
            return Ok(hit.clone());
        }

        let parsed = ReferenceUrl::parse(url)?;
        let lookup = match self.host.get_milestone(&parsed.repo, parsed.number).await {
            Ok(Some(milestone)) => RefLookup::Found(milestone),
            Ok(None) => {
                tracing::warn!("Reference milestone not found: {}", url);
                RefLookup::NotFound
            }
            Err(e) => {
                tracing::warn!("Reference milestone lookup failed for {}: {}", url, e);
                RefLookup::Failed(e.to_string())
            }
        };

        if !matches!(lookup, RefLookup::Failed(_)) {
            self.cache.insert(url.to_string(), lookup.clone());
        }
        Ok(lookup)
    }
}

/// Effective identity of one milestone spec after the precedence rules ran.
#[derive(Debug, Clone)]
pub struct ResolvedMilestone {
    pub name: String,
    pub description: FieldValue,
    /// Full ISO-8601 timestamp when `Set`.
    pub due_on: FieldValue,
    /// True when the reference milestone resolved successfully.
    pub linked: bool,
}

/// Applies the name / description / due-date precedence rules to one spec.
/// `reference` is the lookup result when `referenceMilestoneUrl` was set.
pub fn resolve_fields(
    spec: &MilestoneConfig,
    reference: Option<&RefLookup>,
) -> Result<ResolvedMilestone> {
    let found = match reference {
        Some(RefLookup::Found(m)) => Some(m),
        _ => None,
    };

    let name = match reference {
        Some(RefLookup::Found(m)) => m.title.clone(),
        Some(lookup) => match &spec.name {
            Some(name) => {
                tracing::warn!(
                    "Reference milestone unavailable, falling back to configured name: {}",
                    name
                );
                name.clone()
            }
            None => {
                return Err(match lookup {
                    RefLookup::Failed(message) => SyncError::ReferenceLookupFailed {
                        url: spec.reference_milestone_url.clone().unwrap_or_default(),
                        message: message.clone(),
                    },
                    _ => SyncError::UnresolvableName,
                })
            }
        },
        None => spec.name.clone().ok_or(SyncError::UnresolvableName)?,
    };

    // A linked milestone's description is never independently authored; it
    // always points at the reference URL, even while the reference is
    // unavailable.
    let description = match &spec.reference_milestone_url {
        Some(url) => FieldValue::Set(format!("See {}", url)),
        None => spec.description.clone(),
    };

    let due_on = if spec.reference_milestone_url.is_some() {
        match found.and_then(|m| m.due_on.clone()) {
            Some(due) => FieldValue::Set(due),
            None => FieldValue::Unset,
        }
    } else {
        match &spec.due_date {
            FieldValue::Set(date) => FieldValue::Set(to_due_on(date)?),
            other => other.clone(),
        }
    };

    Ok(ResolvedMilestone {
        name,
        description,
        due_on,
        linked: found.is_some(),
    })
}

/// `YYYY-MM-DD` → full ISO-8601 timestamp at midnight UTC.
pub fn to_due_on(date: &str) -> Result<String> {
    let parsed =
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| SyncError::InvalidDateFormat {
            value: date.to_string(),
        })?;
    Ok(format!("{}T00:00:00Z", parsed.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: Option<&str>, url: Option<&str>) -> MilestoneConfig {
        MilestoneConfig {
            name: name.map(String::from),
            reference_milestone_url: url.map(String::from),
            existing_name_to_rename: None,
            description: FieldValue::Unset,
            due_date: FieldValue::Unset,
        }
    }

    fn reference_milestone() -> RemoteMilestone {
        RemoteMilestone {
            number: 3,
            title: "Release 2.0".to_string(),
            description: Some("upstream".to_string()),
            due_on: Some("2025-09-15T00:00:00Z".to_string()),
            state: "open".to_string(),
        }
    }

    #[test]
    fn test_parse_reference_url() {
        let parsed = ReferenceUrl::parse("https://github.com/acme/api/milestone/3").unwrap();
        assert_eq!(parsed.repo.to_string(), "acme/api");
        assert_eq!(parsed.number, 3);

        // Any https host is accepted.
        assert!(ReferenceUrl::parse("https://ghe.corp/acme/api/milestone/12").is_ok());
    }

    #[test]
    fn test_parse_reference_url_rejects_deviations() {
        for url in [
            "http://github.com/acme/api/milestone/3",
            "https://github.com/acme/api/milestones/3",
            "https://github.com/acme/milestone/3",
            "https://github.com/acme/api/milestone/three",
            "https://github.com/acme/api/milestone/3/extra",
            "not a url",
        ] {
            let err = ReferenceUrl::parse(url).unwrap_err();
            assert!(
                matches!(err, SyncError::InvalidReferenceUrl { .. }),
                "expected InvalidReferenceUrl for {}",
                url
            );
        }
    }

    #[test]
    fn test_to_due_on() {
        assert_eq!(to_due_on("2025-03-01").unwrap(), "2025-03-01T00:00:00Z");

        let err = to_due_on("03/01/2025").unwrap_err();
        match err {
            SyncError::InvalidDateFormat { value } => assert_eq!(value, "03/01/2025"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(to_due_on("2025-02-30").is_err());
    }

    #[test]
    fn test_name_from_reference_wins_over_literal() {
        let spec = spec(Some("Local"), Some("https://github.com/acme/api/milestone/3"));
        let lookup = RefLookup::Found(reference_milestone());
        let resolved = resolve_fields(&spec, Some(&lookup)).unwrap();
        assert_eq!(resolved.name, "Release 2.0");
        assert!(resolved.linked);
    }

    #[test]
    fn test_name_falls_back_when_reference_missing() {
        let spec = spec(Some("Local"), Some("https://github.com/acme/api/milestone/3"));
        let resolved = resolve_fields(&spec, Some(&RefLookup::NotFound)).unwrap();
        assert_eq!(resolved.name, "Local");
        assert!(!resolved.linked);

        let resolved =
            resolve_fields(&spec, Some(&RefLookup::Failed("boom".to_string()))).unwrap();
        assert_eq!(resolved.name, "Local");
    }

    #[test]
    fn test_unresolvable_name() {
        let spec_with_url = spec(None, Some("https://github.com/acme/api/milestone/3"));
        let err = resolve_fields(&spec_with_url, Some(&RefLookup::NotFound)).unwrap_err();
        assert!(matches!(err, SyncError::UnresolvableName));

        let err = resolve_fields(&spec(None, None), None).unwrap_err();
        assert!(matches!(err, SyncError::UnresolvableName));
    }

    #[test]
    fn test_lookup_failure_without_fallback_is_reported_as_such() {
        let spec = spec(None, Some("https://github.com/acme/api/milestone/3"));
        let err =
            resolve_fields(&spec, Some(&RefLookup::Failed("timeout".to_string()))).unwrap_err();
        match err {
            SyncError::ReferenceLookupFailed { url, message } => {
                assert_eq!(url, "https://github.com/acme/api/milestone/3");
                assert_eq!(message, "timeout");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_linked_description_and_due_date() {
        let url = "https://github.com/acme/api/milestone/3";
        let mut spec = spec(None, Some(url));
        spec.description = FieldValue::Set("ignored".to_string());

        let lookup = RefLookup::Found(reference_milestone());
        let resolved = resolve_fields(&spec, Some(&lookup)).unwrap();
        assert_eq!(
            resolved.description,
            FieldValue::Set(format!("See {}", url))
        );
        assert_eq!(
            resolved.due_on,
            FieldValue::Set("2025-09-15T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_linked_due_date_untouched_when_reference_has_none() {
        let mut reference = reference_milestone();
        reference.due_on = None;
        let spec = spec(None, Some("https://github.com/acme/api/milestone/3"));
        let resolved = resolve_fields(&spec, Some(&RefLookup::Found(reference))).unwrap();
        assert_eq!(resolved.due_on, FieldValue::Unset);
    }

    #[test]
    fn test_unlinked_due_date_three_states() {
        let mut plain = spec(Some("M4"), None);
        assert_eq!(
            resolve_fields(&plain, None).unwrap().due_on,
            FieldValue::Unset
        );

        plain.due_date = FieldValue::Clear;
        assert_eq!(
            resolve_fields(&plain, None).unwrap().due_on,
            FieldValue::Clear
        );

        plain.due_date = FieldValue::Set("2025-06-01".to_string());
        assert_eq!(
            resolve_fields(&plain, None).unwrap().due_on,
            FieldValue::Set("2025-06-01T00:00:00Z".to_string())
        );

        plain.due_date = FieldValue::Set("June 1st".to_string());
        assert!(matches!(
            resolve_fields(&plain, None).unwrap_err(),
            SyncError::InvalidDateFormat { .. }
        ));
    }
}
