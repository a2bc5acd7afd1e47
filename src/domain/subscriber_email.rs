use validator::ValidateEmail;

#[derive(Debug, Clone)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Accepts the `local@domain.tld` shape: the `validator` check plus a
    /// dotted domain, so bare hostnames do not slip through.
    pub fn parse(s: String) -> Result<Self, String> {
        let has_dotted_domain = s
            .rsplit_once('@')
            .is_some_and(|(_, domain)| domain.contains('.'));

        if !s.validate_email() || !has_dotted_domain {
            return Err(format!("{} is not a valid subscriber email.", s));
        };
        Ok(Self(s))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for SubscriberEmail {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        SubscriberEmail::parse(value)
    }
}
