use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const EMAIL_MAX_LEN: usize = 254;

/// The email a user is known by. Owner fields on every stored document hold one of these.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The email address is invalid: {0:?}")]
pub struct InvalidEmailError(String);

impl Email {
    pub fn new(email: String) -> Result<Self, InvalidEmailError> {
        let valid = email.chars().count() <= EMAIL_MAX_LEN
            && !email.chars().any(char::is_whitespace)
            && email
                .split_once('@')
                .is_some_and(|(local, domain)| {
                    !local.is_empty() && !domain.is_empty() && !domain.contains('@')
                });

        if valid {
            Ok(Email(email))
        } else {
            Err(InvalidEmailError(email))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Email {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Email::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Email"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(Email::new("a@x.com".to_owned()).is_ok());
        assert!(Email::new("first.last+tag@sub.example.org".to_owned()).is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "@x.com", "a@", "a@b@c", "a b@x.com"] {
            assert!(Email::new(bad.to_owned()).is_err(), "{bad:?} was accepted");
        }

        let too_long = format!("{}@x.com", "a".repeat(EMAIL_MAX_LEN));
        assert!(Email::new(too_long).is_err());
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<Email>("\"a@x.com\"").is_ok());
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }
}
