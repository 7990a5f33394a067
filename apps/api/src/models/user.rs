use sqlx::FromRow;
use uuid::Uuid;

/// Account row. Never serialized: it carries the GitHub token.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub github_username: Option<String>,
    pub github_access_token: Option<String>,
}

impl User {
    /// Token and handle of the linked GitHub account, if both are set.
    pub fn github_link(&self) -> Option<(&str, &str)> {
        let token = self.github_access_token.as_deref().filter(|t| !t.is_empty())?;
        let username = self.github_username.as_deref().filter(|u| !u.is_empty())?;
        Some((token, username))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(token: Option<&str>, name: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            github_username: name.map(str::to_string),
            github_access_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_github_link_requires_both_fields() {
        assert_eq!(user(Some("t"), Some("octo")).github_link(), Some(("t", "octo")));
        assert_eq!(user(None, Some("octo")).github_link(), None);
        assert_eq!(user(Some("t"), Some("")).github_link(), None);
    }
}
