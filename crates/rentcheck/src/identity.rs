//! Anonymous identifiers used to group submissions without accounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, warn};
use uuid::{Uuid, Variant};

/// Random UUID v4 text identifying a device or browser, never a person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnonymousUserId(String);

impl AnonymousUserId {
    pub fn generate() -> Self {
        Self(uuid_v4())
    }

    /// Accepts v4 text in either case and stores it lowercased and hyphenated.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let malformed = || IdentityError::Malformed(raw.to_string());
        let uuid = Uuid::parse_str(raw.trim()).map_err(|_| malformed())?;
        if uuid.get_version_num() != 4 || uuid.get_variant() != Variant::RFC4122 {
            return Err(malformed());
        }
        Ok(Self(uuid.hyphenated().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnonymousUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AnonymousUserId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AnonymousUserId> for String {
    fn from(value: AnonymousUserId) -> Self {
        value.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("'{0}' is not a UUID v4 identifier")]
    Malformed(String),
    #[error("user id storage unavailable: {0}")]
    Storage(String),
}

/// Random `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx` text, `y` in `8..=b`.
pub fn uuid_v4() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Device-local persistence for the anonymous identifier.
pub trait UserIdStore: Send + Sync {
    fn load(&self) -> Result<Option<AnonymousUserId>, IdentityError>;
    fn save(&self, id: &AnonymousUserId) -> Result<(), IdentityError>;
    fn clear(&self) -> Result<(), IdentityError>;
}

#[derive(Debug, Default)]
pub struct InMemoryUserIdStore {
    slot: Mutex<Option<AnonymousUserId>>,
}

impl InMemoryUserIdStore {
    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<AnonymousUserId>>, IdentityError> {
        self.slot
            .lock()
            .map_err(|_| IdentityError::Storage("user id mutex poisoned".to_string()))
    }
}

impl UserIdStore for InMemoryUserIdStore {
    fn load(&self) -> Result<Option<AnonymousUserId>, IdentityError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, id: &AnonymousUserId) -> Result<(), IdentityError> {
        *self.slot()? = Some(id.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), IdentityError> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Return the stored id, creating and saving one on first use.
///
/// Storage failures never block scoring: a fresh, unsaved id is returned instead.
pub fn resolve_user_id<S: UserIdStore + ?Sized>(store: &S) -> AnonymousUserId {
    match store.load() {
        Ok(Some(id)) => {
            debug!(user_id = %id, "reusing anonymous user id");
            id
        }
        Ok(None) => {
            let id = AnonymousUserId::generate();
            if let Err(err) = store.save(&id) {
                warn!(error = %err, "could not persist anonymous user id");
            } else {
                debug!(user_id = %id, "generated anonymous user id");
            }
            id
        }
        Err(err) => {
            warn!(error = %err, "user id storage unreadable, using ephemeral id");
            AnonymousUserId::generate()
        }
    }
}

pub fn clear_user_id<S: UserIdStore + ?Sized>(store: &S) -> Result<(), IdentityError> {
    store.clear()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl UserIdStore for BrokenStore {
        fn load(&self) -> Result<Option<AnonymousUserId>, IdentityError> {
            Err(IdentityError::Storage("disk full".to_string()))
        }

        fn save(&self, _id: &AnonymousUserId) -> Result<(), IdentityError> {
            Err(IdentityError::Storage("disk full".to_string()))
        }

        fn clear(&self) -> Result<(), IdentityError> {
            Err(IdentityError::Storage("disk full".to_string()))
        }
    }

    #[test]
    fn generated_ids_are_version_four() {
        for _ in 0..64 {
            let id = AnonymousUserId::generate();
            assert_eq!(id.as_str().len(), 36);
            assert_eq!(id.as_str().as_bytes()[14], b'4');
            assert!(matches!(id.as_str().as_bytes()[19], b'8' | b'9' | b'a' | b'b'), "{id}");
            assert_eq!(AnonymousUserId::parse(id.as_str()).expect("parses"), id);
        }
    }

    #[test]
    fn parse_rejects_other_formats() {
        for raw in [
            "",
            "not-a-uuid",
            "123e4567-e89b-12d3-a456-426614174000",
            "123e4567-e89b-42d3-c456-426614174000",
        ] {
            assert!(AnonymousUserId::parse(raw).is_err(), "{raw}");
        }

        let upper = AnonymousUserId::parse("123E4567-E89B-42D3-A456-426614174000")
            .expect("uppercase accepted");
        assert_eq!(upper.as_str(), "123e4567-e89b-42d3-a456-426614174000");

        let compact = AnonymousUserId::parse("123e4567e89b42d3a456426614174000")
            .expect("unhyphenated accepted");
        assert_eq!(compact, upper);
    }

    #[test]
    fn resolve_persists_and_reuses_id() {
        let store = InMemoryUserIdStore::default();

        let first = resolve_user_id(&store);
        let second = resolve_user_id(&store);
        assert_eq!(first, second);

        clear_user_id(&store).expect("clear succeeds");
        let third = resolve_user_id(&store);
        assert_ne!(first, third);
    }

    #[test]
    fn storage_failure_still_yields_an_id() {
        let id = resolve_user_id(&BrokenStore);
        assert!(AnonymousUserId::parse(id.as_str()).is_ok(), "{id}");
    }

    #[test]
    fn deserialization_validates_format() {
        let ok: AnonymousUserId =
            serde_json::from_str(r#""123e4567-e89b-42d3-a456-426614174000""#).expect("valid");
        assert_eq!(ok.to_string(), "123e4567-e89b-42d3-a456-426614174000");
        assert!(serde_json::from_str::<AnonymousUserId>(r#""abc""#).is_err());
    }
}
