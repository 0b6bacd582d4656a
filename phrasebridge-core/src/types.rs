//! Domain types mirrored from the Phrase API plus the local project descriptor.
//!
//! Locale and upload payloads are snapshots of what the remote service
//! returns; nothing here is mutated after it is fetched.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of a project on the Phrase side.
    ProjectId
);
string_id!(
    /// Identifier of a locale on the Phrase side.
    LocaleId
);
string_id!(
    /// Opaque identifier assigned by Phrase when an upload is created.
    UploadId
);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which way translations flow during a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    /// Upload the default locale file to Phrase.
    Push,
    /// Download every locale from Phrase into the repository.
    Pull,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::Push => write!(f, "push"),
            SyncDirection::Pull => write!(f, "pull"),
        }
    }
}

impl FromStr for SyncDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Ok(Self::Push),
            "pull" => Ok(Self::Pull),
            other => Err(format!(
                "unknown sync direction '{other}'; expected: push, pull"
            )),
        }
    }
}

/// Processing state of an upload.
///
/// Only `Success` and `Error` are terminal. Any other value reported by the
/// service, or no value at all, is treated as still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum UploadState {
    #[default]
    Pending,
    Success,
    Error,
}

impl UploadState {
    /// Classify a raw `state` string as returned by the service.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("success") => Self::Success,
            Some("error") => Self::Error,
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl From<Option<String>> for UploadState {
    fn from(raw: Option<String>) -> Self {
        Self::from_raw(raw.as_deref())
    }
}

impl From<UploadState> for Option<String> {
    fn from(state: UploadState) -> Self {
        let raw = match state {
            UploadState::Pending => "pending",
            UploadState::Success => "success",
            UploadState::Error => "error",
        };
        Some(raw.to_string())
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadState::Pending => write!(f, "pending"),
            UploadState::Success => write!(f, "success"),
            UploadState::Error => write!(f, "error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote payloads
// ---------------------------------------------------------------------------

/// The locale a translated locale was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocale {
    pub id: LocaleId,
    pub name: String,
    pub code: String,
}

/// A locale of a Phrase project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub id: LocaleId,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub main: bool,
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub plural_forms: Vec<String>,
    #[serde(default)]
    pub source_locale: Option<SourceLocale>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A file upload job as observed through the uploads endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub id: UploadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub state: UploadState,
}

// ---------------------------------------------------------------------------
// Local configuration
// ---------------------------------------------------------------------------

/// One project entry of `phrase.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub name: String,
    pub project_id: ProjectId,
    /// Directory holding `<locale name>.json` files, relative to the repo root.
    pub locale_path: PathBuf,
    /// Name (not id) of the locale that is uploaded on push.
    pub default_locale: String,
}

impl ProjectDescriptor {
    /// Path of the JSON file for the locale called `locale_name`.
    pub fn locale_file(&self, locale_name: &str) -> PathBuf {
        self.locale_path.join(format!("{locale_name}.json"))
    }

    pub fn default_locale_file(&self) -> PathBuf {
        self.locale_file(&self.default_locale)
    }

    /// Find the configured default locale in a fetched locale list.
    pub fn find_default_locale<'a>(&self, locales: &'a [Locale]) -> Option<&'a Locale> {
        locales.iter().find(|l| l.name == self.default_locale)
    }
}

/// Root of `phrase.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectsFile {
    #[serde(default)]
    pub projects: Vec<ProjectDescriptor>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
