//! Anime entity
//!
//! The only domain record: an integer id assigned by the store and a
//! display name that must never be persisted empty.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Anime record as stored and as exchanged over HTTP.
///
/// `id` is `None` until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anime {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
}

impl Anime {
    /// Build an unsaved anime.
    ///
    /// # Example
    /// ```
    /// use animectl_server::models::Anime;
    ///
    /// let anime = Anime::new("Tensei").with_id(1);
    /// assert_eq!(anime.id, Some(1));
    /// assert_eq!(anime.name, "Tensei");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Copy of this record with the given id.
    pub fn with_id(self, id: i32) -> Self {
        Self {
            id: Some(id),
            ..self
        }
    }

    /// Copy of this record with the given name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Check the non-empty name constraint.
    ///
    /// Any non-empty string is accepted, including whitespace.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_fields() {
        let anime = Anime::new("Tensei");
        assert_eq!(anime.id, None);

        let anime = anime.with_id(7).with_name("Shingeki");
        assert_eq!(anime, Anime { id: Some(7), name: "Shingeki".into() });
    }

    #[test]
    fn rejects_empty_name() {
        let err = Anime::new("").validate().unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: "name" }));
    }

    #[test]
    fn accepts_whitespace_name() {
        assert!(Anime::new(" ").validate().is_ok());
        assert!(Anime::new("Tensei").validate().is_ok());
    }

    #[test]
    fn json_id_is_optional() {
        let anime: Anime = serde_json::from_str(r#"{"name":"Tensei"}"#).unwrap();
        assert_eq!(anime, Anime::new("Tensei"));

        let json = serde_json::to_value(Anime::new("Tensei").with_id(1)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "Tensei"}));
    }

    #[test]
    fn json_requires_name() {
        assert!(serde_json::from_str::<Anime>(r#"{"id":1}"#).is_err());
        assert!(serde_json::from_str::<Anime>(r#"{"id":1,"name":null}"#).is_err());
    }
}
