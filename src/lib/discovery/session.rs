use super::models::Config;

/// Credentials of the current session, built once and handed to whoever talks to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        let token = token
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_token.clone())
    }

    pub fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_anonymous() {
        let session = Session::new(Some("   ".to_owned()));
        assert!(!session.is_authenticated());
        assert_eq!(session.current_token(), None);
        assert_eq!(session, Session::anonymous());
    }

    #[test]
    fn token_is_trimmed() {
        let session = Session::new(Some(" abc.def \n".to_owned()));
        assert!(session.is_authenticated());
        assert_eq!(session.current_token(), Some("abc.def"));
    }
}
