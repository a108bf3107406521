//! Assume-role methods supported when a connection carries a role ARN.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How temporary credentials are obtained for a role ARN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumeRoleMethod {
    #[default]
    AssumeRole,
    AssumeRoleWithSaml,
    AssumeRoleWithWebIdentity,
}

impl AssumeRoleMethod {
    /// All supported methods, in documentation order.
    pub const ALL: [AssumeRoleMethod; 3] = [
        AssumeRoleMethod::AssumeRole,
        AssumeRoleMethod::AssumeRoleWithSaml,
        AssumeRoleMethod::AssumeRoleWithWebIdentity,
    ];

    /// Wire name as written in a connection extra.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssumeRoleMethod::AssumeRole => "assume_role",
            AssumeRoleMethod::AssumeRoleWithSaml => "assume_role_with_saml",
            AssumeRoleMethod::AssumeRoleWithWebIdentity => "assume_role_with_web_identity",
        }
    }

    /// Parse a method name; `None` for anything unsupported.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Comma separated list of supported names, for error messages.
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AssumeRoleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
