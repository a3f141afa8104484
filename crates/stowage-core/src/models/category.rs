use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::policy::PolicyRule;

/// Upload category
///
/// Every stored object belongs to exactly one category. The category selects the
/// validation policy and the path segment the object is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadCategory {
    #[serde(alias = "pictures")]
    Picture,
    #[serde(alias = "previews")]
    Preview,
    #[serde(alias = "resumes", alias = "resume")]
    Document,
}

impl UploadCategory {
    pub const ALL: [UploadCategory; 3] = [
        UploadCategory::Picture,
        UploadCategory::Preview,
        UploadCategory::Document,
    ];

    /// External path segment used in storage keys and the bucket policy.
    pub fn path_segment(self) -> &'static str {
        match self {
            UploadCategory::Picture => "pictures",
            UploadCategory::Preview => "previews",
            UploadCategory::Document => "resumes",
        }
    }

    /// Whether uploads in this category are expected to be images.
    pub fn is_image(self) -> bool {
        matches!(self, UploadCategory::Picture | UploadCategory::Preview)
    }

    /// Extension assumed when an object is addressed by a bare name.
    pub fn default_extension(self) -> &'static str {
        match self {
            UploadCategory::Document => "pdf",
            UploadCategory::Picture | UploadCategory::Preview => "jpg",
        }
    }

    pub fn policy(self) -> &'static PolicyRule {
        PolicyRule::for_category(self)
    }
}

impl FromStr for UploadCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "picture" | "pictures" => Ok(UploadCategory::Picture),
            "preview" | "previews" => Ok(UploadCategory::Preview),
            "document" | "documents" | "resume" | "resumes" => Ok(UploadCategory::Document),
            _ => Err(anyhow::anyhow!(
                "Invalid upload category: {} (expected picture, preview or document)",
                s
            )),
        }
    }
}

impl Display for UploadCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadCategory::Picture => write!(f, "picture"),
            UploadCategory::Preview => write!(f, "preview"),
            UploadCategory::Document => write!(f, "document"),
        }
    }
}
