//! Identity data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

/// External identity providers the catalog accepts logins from
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Facebook,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Facebook => "facebook",
            Provider::Google => "google",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-scoped subject id, tagged with the provider that issued it.
///
/// Serialized with the historical field names (`facebook_id` / `gplus_id`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderSubject {
    Facebook { facebook_id: String },
    Google { gplus_id: String },
}

impl ProviderSubject {
    pub fn new(provider: Provider, subject_id: impl Into<String>) -> Self {
        match provider {
            Provider::Facebook => ProviderSubject::Facebook {
                facebook_id: subject_id.into(),
            },
            Provider::Google => ProviderSubject::Google {
                gplus_id: subject_id.into(),
            },
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            ProviderSubject::Facebook { .. } => Provider::Facebook,
            ProviderSubject::Google { .. } => Provider::Google,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ProviderSubject::Facebook { facebook_id } => facebook_id,
            ProviderSubject::Google { gplus_id } => gplus_id,
        }
    }
}

/// Result of upgrading a browser-supplied artifact with a provider
#[derive(Debug, Clone)]
pub struct ProviderGrant {
    pub access_token: String,
    /// Subject claimed by the provider's id token, when the exchange returns one
    pub subject_hint: Option<String>,
}

/// Verified identity profile returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    pub name: String,
    pub email: String,
    pub picture: String,
    pub subject_id: String,
    pub access_token: String,
}

/// Query string carried by both provider callbacks
#[derive(Deserialize, Debug, Default)]
pub struct CallbackQuery {
    pub state: Option<String>,
}
