//! Query builder: flattens project requirements and profile into one text
//! blob plus the token sets the scorer matches against.

use std::collections::BTreeSet;

use crate::config::AgencyConfig;
use crate::profile::Profile;
use crate::utils::text::{normalize_set, token_set};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// Whitespace-joined query text.
    pub text: String,
    /// Tokens of `text` (see [`crate::utils::text::tokenize`]).
    pub tokens: BTreeSet<String>,
    /// Lower-cased required/optional roles and named agents.
    pub role_tokens: BTreeSet<String>,
}

impl QueryContext {
    #[must_use]
    pub fn build(config: &AgencyConfig, profile: &Profile) -> Self {
        let text = build_query_text(config, profile);
        let tokens = token_set(&text);
        let role_tokens = role_tokens(config);
        Self {
            text,
            tokens,
            role_tokens,
        }
    }
}

/// Concatenate, in fixed order and skipping empty segments: free-text
/// requirements, functional text, nonfunctional list, capabilities, profile
/// domains, then languages, frameworks, datastores and infra.
#[must_use]
pub fn build_query_text(config: &AgencyConfig, profile: &Profile) -> String {
    let stack = &profile.tech_stack;
    let segments = [
        config.project_requirements.clone().unwrap_or_default(),
        config.requirements.functional.clone().unwrap_or_default(),
        config.requirements.nonfunctional.join(" "),
        config.capabilities.join(" "),
        profile.domains.join(" "),
        stack.languages.join(" "),
        stack.frameworks.join(" "),
        stack.datastores.join(" "),
        stack.infra.join(" "),
    ];

    segments
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-cased union of required roles, optional roles and named agents.
#[must_use]
pub fn role_tokens(config: &AgencyConfig) -> BTreeSet<String> {
    let roles = &config.role_policy;
    normalize_set(
        roles
            .required_roles
            .iter()
            .map(String::as_str)
            .chain(roles.optional_roles.iter().map(String::as_str))
            .chain(config.required_agent_names()),
    )
}
