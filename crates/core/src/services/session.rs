//! Session resolution.

use condovote_common::{AppError, AppResult};
use condovote_db::{entities::profile, repositories::ProfileRepository};

/// Resolves bearer tokens to profiles.
#[derive(Clone)]
pub struct SessionService {
    profile_repo: ProfileRepository,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self { profile_repo }
    }

    /// Look up the profile owning `token`.
    pub async fn authenticate(&self, token: &str) -> AppResult<profile::Model> {
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        self.profile_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::access::Actor;
    use crate::services::fixtures;
    use chrono::Utc;
    use condovote_db::entities::profile::Role;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_profile() -> profile::Model {
        profile::Model {
            id: "u1".to_string(),
            condo_id: "condo1".to_string(),
            unit_id: Some("101".to_string()),
            role: Role::Morador,
            name: "Maria".to_string(),
            token: Some("tok".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_known_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_profile()]])
                .into_connection(),
        );
        let service = SessionService::new(ProfileRepository::new(db));

        let profile = service.authenticate("tok").await.unwrap();
        assert_eq!(Actor::from(&profile).unit_id.as_deref(), Some("101"));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );
        let service = SessionService::new(ProfileRepository::new(db));

        assert!(matches!(
            service.authenticate("nope").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_empty_token_skips_lookup() {
        let service = SessionService::new(ProfileRepository::new(fixtures::empty_db()));

        assert!(matches!(
            service.authenticate("").await,
            Err(AppError::Unauthorized)
        ));
    }
}
