use serde::{Deserialize, Serialize};

/// Placeholder written into freshly generated `.env` files
pub const JIRA_TOKEN_PLACEHOLDER: &str = "<your secret jira token goes here>";

/// Tokens shorter than this are never shown, not even in part
const MIN_PARTLY_VISIBLE_TOKEN_LEN: usize = 12;

/// What is needed to talk to a Jira Cloud site on behalf of a user
#[derive(Serialize, Deserialize, PartialEq, Clone)]
pub struct JiraClientConfiguration {
    /// Base URL of the Jira site, i.e. `https://yourcompany.atlassian.net`
    pub jira_url: String,
    /// E-mail address of the account owning the token
    pub user: String,
    pub token: String,
}

impl JiraClientConfiguration {
    /// Does the token look like a valid Jira Security token?
    #[must_use]
    pub fn has_valid_jira_token(&self) -> bool {
        !(self.token.trim().is_empty() || self.token.trim() == JIRA_TOKEN_PLACEHOLDER)
    }

    /// The token with everything but the last four characters masked out. Short tokens are
    /// masked entirely.
    #[must_use]
    pub fn masked_token(&self) -> String {
        if self.token.chars().count() < MIN_PARTLY_VISIBLE_TOKEN_LEN {
            return "****".to_string();
        }
        let visible: String = self
            .token
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{visible}")
    }
}

// The token never ends up in log output
impl std::fmt::Debug for JiraClientConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClientConfiguration")
            .field("jira_url", &self.jira_url)
            .field("user", &self.user)
            .field("token", &self.masked_token())
            .finish()
    }
}
