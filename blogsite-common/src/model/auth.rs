use crate::model::user::{Email, InvalidEmailError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims of an identity-provider ID token that the service looks at.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub aud: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum IdentityClaimsError {
    #[error("The token has an empty subject")]
    EmptySubject,
    #[error("The token carries no email claim")]
    MissingEmail,
    #[error(transparent)]
    InvalidEmail(#[from] InvalidEmailError),
}

/// The caller of a request, as established by a verified token. Lives for one request.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Identity {
    pub uid: String,
    pub email: Email,
}

impl TryFrom<IdTokenClaims> for Identity {
    type Error = IdentityClaimsError;

    fn try_from(value: IdTokenClaims) -> Result<Self, Self::Error> {
        if value.sub.is_empty() {
            return Err(IdentityClaimsError::EmptySubject);
        }

        let email = value.email.ok_or(IdentityClaimsError::MissingEmail)?;

        Ok(Self {
            uid: value.sub,
            email: Email::new(email)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, email: Option<&str>) -> IdTokenClaims {
        IdTokenClaims {
            sub: sub.to_owned(),
            aud: "blog".to_owned(),
            iss: "https://securetoken.google.com/blog".to_owned(),
            iat: 0,
            exp: 0,
            email: email.map(str::to_owned),
            email_verified: None,
        }
    }

    #[test]
    fn identity_takes_subject_and_email() {
        let identity = Identity::try_from(claims("uid-1", Some("a@x.com"))).unwrap();

        assert_eq!(identity.uid, "uid-1");
        assert_eq!(identity.email.get(), "a@x.com");
    }

    #[test]
    fn identity_requires_email_and_subject() {
        assert_eq!(
            Identity::try_from(claims("uid-1", None)),
            Err(IdentityClaimsError::MissingEmail)
        );
        assert_eq!(
            Identity::try_from(claims("", Some("a@x.com"))),
            Err(IdentityClaimsError::EmptySubject)
        );
        assert!(matches!(
            Identity::try_from(claims("uid-1", Some("not-an-email"))),
            Err(IdentityClaimsError::InvalidEmail(_))
        ));
    }
}
