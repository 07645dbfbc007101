//! Draft identity, content and wire shapes.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one draft-save stream: a user's invitation, by title.
///
/// Both parts are required. A key can only be built through [`DraftKey::new`],
/// so every key in the cache has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DraftKey {
    user_id: String,
    invitation_title: String,
}

impl DraftKey {
    /// Build a key, rejecting blank parts.
    pub fn new(
        user_id: impl Into<String>,
        invitation_title: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let user_id = user_id.into();
        let invitation_title = invitation_title.into();

        if user_id.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "user_id".to_string(),
            });
        }
        if invitation_title.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "invitation_title".to_string(),
            });
        }

        Ok(Self {
            user_id,
            invitation_title,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn invitation_title(&self) -> &str {
        &self.invitation_title
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.invitation_title)
    }
}

/// Editable invitation content submitted by the form builder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftContent {
    /// Guest names, comma or newline separated, as typed by the user.
    pub names_list: String,
    pub template_text: String,
    /// Checklist state as a JSON document, if the user has one.
    #[serde(default)]
    pub checklist_data: Option<String>,
}

impl DraftContent {
    pub fn new(names_list: impl Into<String>, template_text: impl Into<String>) -> Self {
        Self {
            names_list: names_list.into(),
            template_text: template_text.into(),
            checklist_data: None,
        }
    }

    pub fn with_checklist(mut self, checklist_data: impl Into<String>) -> Self {
        self.checklist_data = Some(checklist_data.into());
        self
    }

    /// Individual guest names, trimmed, blanks dropped.
    pub fn names(&self) -> Vec<&str> {
        self.names_list
            .split([',', '\n'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// Body of the outbound save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveDraftRequest<'a> {
    pub user_id: &'a str,
    pub invitation_title: &'a str,
    pub names_list: &'a str,
    pub template_text: &'a str,
    pub checklist_data: Option<&'a str>,
}

impl<'a> SaveDraftRequest<'a> {
    pub fn new(key: &'a DraftKey, content: &'a DraftContent) -> Self {
        Self {
            user_id: key.user_id(),
            invitation_title: key.invitation_title(),
            names_list: &content.names_list,
            template_text: &content.template_text,
            checklist_data: content.checklist_data.as_deref(),
        }
    }
}

/// A stored draft as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub names_list: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub template_text: String,
    #[serde(default)]
    pub checklist_data: Option<String>,
    /// Backend-formatted time of the last save. Passed through verbatim.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Backends store unset text columns as NULL; read them as empty text.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Draft {
    /// The editable part of this draft.
    pub fn content(&self) -> DraftContent {
        DraftContent {
            names_list: self.names_list.clone(),
            template_text: self.template_text.clone(),
            checklist_data: self.checklist_data.clone(),
        }
    }
}

/// Acknowledgment of an accepted save.
///
/// Returned both when the backend confirmed the save and when an identical
/// resubmission was coalesced into an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAck {
    pub success: bool,
}

impl SaveAck {
    pub fn success() -> Self {
        Self { success: true }
    }
}
