//! Everything related to users.
//!
//! There are two kinds of user objects:
//! - [PartialUser]: the public profile embedded in other objects, such as a playlist's owner or the user who added an
//!   item to a playlist.
//! - [User]: the full profile from the current user endpoint. Some of its fields are only available with certain
//!   scopes: `email` requires [UserReadEmail](crate::scope::Scope::UserReadEmail) while `country`, `product` and
//!   `explicit_content` require [UserReadPrivate](crate::scope::Scope::UserReadPrivate). Without the scope, the field
//!   is `None`.
//!
//! Information common to both is available through [CommonUserInformation].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ExternalUrls, Followers, Image};

mod private {
    use super::{CommonUserFields, PrivateUserFields};

    pub(super) trait CommonFields {
        fn common_fields(&self) -> &CommonUserFields;
    }

    pub(super) trait PrivateFields {
        fn private_fields(&self) -> &PrivateUserFields;
    }
}

/// Information about a user's explicit content settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitContent {
    /// When `true`, indicates that explicit content should not be played.
    pub filter_enabled: bool,
    /// When `true`, indicates that the explicit content setting is locked and can't be changed by the user.
    pub filter_locked: bool,
}

/// Functions for retrieving information that is common to every user type.
pub trait CommonUserInformation: super::private::Sealed {
    /// The user's display name if available.
    fn display_name(&self) -> Option<&str>;
    /// The external URLs for the user.
    fn external_urls(&self) -> &ExternalUrls;
    /// A link to the Web API endpoint for this user.
    fn href(&self) -> &str;
    /// The user's ID.
    fn id(&self) -> &str;
    /// The user's Spotify URI.
    fn uri(&self) -> &str;
}

/// Functions for retrieving information only in the full user profile.
pub trait PrivateUserInformation: super::private::Sealed {
    /// The user's country as an ISO 3166-1 alpha-2 country code.
    fn country(&self) -> Option<&str>;
    /// The user's email. This email address is unverified.
    fn email(&self) -> Option<&str>;
    /// The user's explicit content settings.
    fn explicit_content(&self) -> Option<ExplicitContent>;
    /// Information about the user's followers.
    fn followers(&self) -> Followers;
    /// The user's profile images.
    fn images(&self) -> &[Image];
    /// The user's subscription level, such as `premium` or `free`.
    fn product(&self) -> Option<&str>;
}

/// A user's public profile.
#[derive(Debug, Clone, Deserialize)]
pub struct PartialUser {
    #[serde(flatten)]
    common: CommonUserFields,
}

/// The full profile of the current user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(flatten)]
    common: CommonUserFields,
    #[serde(flatten)]
    private: PrivateUserFields,
}

#[derive(Debug, Clone, Deserialize)]
struct CommonUserFields {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
    href: String,
    id: String,
    uri: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PrivateUserFields {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    explicit_content: Option<ExplicitContent>,
    #[serde(default)]
    followers: Followers,
    #[serde(default)]
    images: Vec<Image>,
    #[serde(default)]
    product: Option<String>,
}

impl<T> CommonUserInformation for T
where
    T: private::CommonFields + super::private::Sealed,
{
    fn display_name(&self) -> Option<&str> {
        self.common_fields().display_name.as_deref()
    }

    fn external_urls(&self) -> &ExternalUrls {
        &self.common_fields().external_urls
    }

    fn href(&self) -> &str {
        &self.common_fields().href
    }

    fn id(&self) -> &str {
        &self.common_fields().id
    }

    fn uri(&self) -> &str {
        &self.common_fields().uri
    }
}

impl<T> PrivateUserInformation for T
where
    T: private::PrivateFields + super::private::Sealed,
{
    fn country(&self) -> Option<&str> {
        self.private_fields().country.as_deref()
    }

    fn email(&self) -> Option<&str> {
        self.private_fields().email.as_deref()
    }

    fn explicit_content(&self) -> Option<ExplicitContent> {
        self.private_fields().explicit_content
    }

    fn followers(&self) -> Followers {
        self.private_fields().followers
    }

    fn images(&self) -> &[Image] {
        &self.private_fields().images
    }

    fn product(&self) -> Option<&str> {
        self.private_fields().product.as_deref()
    }
}

impl From<User> for PartialUser {
    fn from(user: User) -> Self {
        PartialUser { common: user.common }
    }
}

impl super::private::Sealed for PartialUser {}
impl super::private::Sealed for User {}

impl private::CommonFields for PartialUser {
    fn common_fields(&self) -> &CommonUserFields {
        &self.common
    }
}

impl private::CommonFields for User {
    fn common_fields(&self) -> &CommonUserFields {
        &self.common
    }
}

impl private::PrivateFields for User {
    fn private_fields(&self) -> &PrivateUserFields {
        &self.private
    }
}

impl PartialEq for PartialUser {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for PartialUser {}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for User {}

impl fmt::Display for PartialUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name().unwrap_or_else(|| self.id()))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name().unwrap_or_else(|| self.id()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::{json, Value};

    use super::*;

    pub(crate) fn partial_user_payload(id: &str) -> Value {
        json!({
            "display_name": "Spotify",
            "external_urls": { "spotify": format!("https://open.spotify.com/user/{id}") },
            "href": format!("https://api.spotify.com/v1/users/{id}"),
            "id": id,
            "type": "user",
            "uri": format!("spotify:user:{id}")
        })
    }

    #[test]
    fn partial_user_without_display_name() {
        let mut payload = partial_user_payload("smedjan");
        payload.as_object_mut().unwrap().remove("display_name");

        let user: PartialUser = serde_json::from_value(payload).unwrap();

        assert_eq!(user.display_name(), None);
        assert_eq!(user.id(), "smedjan");
        assert_eq!(user.to_string(), "smedjan");
    }

    #[test]
    fn full_user_with_private_fields() {
        let user: User = serde_json::from_value(json!({
            "country": "FI",
            "display_name": "Spotify User",
            "email": "user@example.com",
            "explicit_content": { "filter_enabled": false, "filter_locked": false },
            "external_urls": { "spotify": "https://open.spotify.com/user/someuser" },
            "followers": { "href": null, "total": 3 },
            "href": "https://api.spotify.com/v1/users/someuser",
            "id": "someuser",
            "images": [],
            "product": "premium",
            "type": "user",
            "uri": "spotify:user:someuser"
        }))
        .unwrap();

        assert_eq!(user.country(), Some("FI"));
        assert_eq!(user.email(), Some("user@example.com"));
        assert_eq!(user.product(), Some("premium"));
        assert_eq!(
            user.explicit_content(),
            Some(ExplicitContent {
                filter_enabled: false,
                filter_locked: false
            })
        );
        assert_eq!(user.followers().total, 3);
        assert_eq!(user.to_string(), "Spotify User");
    }

    #[test]
    fn full_user_without_scoped_fields() {
        let mut payload = partial_user_payload("someuser");
        payload["followers"] = json!({ "href": null, "total": 0 });
        payload["images"] = json!([]);

        let user: User = serde_json::from_value(payload).unwrap();

        assert_eq!(user.country(), None);
        assert_eq!(user.email(), None);
        assert_eq!(user.product(), None);
        assert_eq!(user.explicit_content(), None);
    }
}
