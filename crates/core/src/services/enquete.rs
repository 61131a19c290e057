//! Enquetes: condominium polls independent of any assembly.

use std::collections::HashMap;

use crate::services::access::{Actor, ClientInfo, Permission};
use crate::services::audit::{AuditEntry, AuditService};
use chrono::{DateTime, Utc};
use condovote_common::{AppError, AppResult, IdGenerator};
use condovote_db::{
    entities::{audit_log::AuditEvent, enquete, enquete_option, enquete_vote},
    repositories::EnqueteRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 20;
const MAX_OPTION_LEN: usize = 200;
const MAX_PAGE_SIZE: u64 = 100;

/// Input for creating an enquete.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnqueteInput {
    /// Defaults to the actor's condominium.
    pub condo_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub options: Vec<String>,
    #[serde(default = "default_true")]
    pub one_vote_per_unit: bool,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

const fn default_true() -> bool {
    true
}

/// An enquete with its options in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueteWithOptions {
    #[serde(flatten)]
    pub enquete: enquete::Model,
    pub options: Vec<enquete_option::Model>,
}

/// Votes received by one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_id: String,
    pub label: String,
    pub count: i64,
}

/// Vote counts of an enquete. Options without votes are listed with zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueteResults {
    pub enquete_id: String,
    pub options: Vec<OptionResult>,
    pub total: i64,
}

/// Enquete service for business logic.
#[derive(Clone)]
pub struct EnqueteService {
    enquete_repo: EnqueteRepository,
    audit: AuditService,
    id_gen: IdGenerator,
}

impl EnqueteService {
    /// Create a new enquete service.
    #[must_use]
    pub const fn new(enquete_repo: EnqueteRepository, audit: AuditService) -> Self {
        Self {
            enquete_repo,
            audit,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an enquete. Each option receives a stable identifier.
    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateEnqueteInput,
        client: &ClientInfo,
    ) -> AppResult<EnqueteWithOptions> {
        input.validate()?;
        let labels = normalize_options(&input.options)?;
        if input.start_at >= input.end_at {
            return Err(AppError::Validation(
                "O início da enquete deve ser anterior ao fim".to_string(),
            ));
        }

        actor.require(Permission::ManageEnquetes)?;
        let condo_id = actor.target_condo(input.condo_id.as_deref())?;

        let enquete = enquete::Model {
            id: self.id_gen.generate(),
            condo_id,
            title: input.title,
            description: input.description,
            one_vote_per_unit: input.one_vote_per_unit,
            start_at: input.start_at.into(),
            end_at: input.end_at.into(),
            created_by: actor.user_id.clone(),
            created_at: Utc::now().into(),
        };
        let options: Vec<enquete_option::Model> = labels
            .into_iter()
            .enumerate()
            .map(|(position, label)| enquete_option::Model {
                id: self.id_gen.generate(),
                enquete_id: enquete.id.clone(),
                label,
                position: position as i32,
            })
            .collect();

        self.enquete_repo
            .create_with_options(
                enquete::ActiveModel {
                    id: Set(enquete.id.clone()),
                    condo_id: Set(enquete.condo_id.clone()),
                    title: Set(enquete.title.clone()),
                    description: Set(enquete.description.clone()),
                    one_vote_per_unit: Set(enquete.one_vote_per_unit),
                    start_at: Set(enquete.start_at),
                    end_at: Set(enquete.end_at),
                    created_by: Set(enquete.created_by.clone()),
                    created_at: Set(enquete.created_at),
                },
                options
                    .iter()
                    .map(|o| enquete_option::ActiveModel {
                        id: Set(o.id.clone()),
                        enquete_id: Set(o.enquete_id.clone()),
                        label: Set(o.label.clone()),
                        position: Set(o.position),
                    })
                    .collect(),
            )
            .await?;

        tracing::info!(enquete_id = %enquete.id, condo_id = %enquete.condo_id, options = options.len(), "Enquete created");

        self.audit
            .record(
                actor,
                client,
                enquete_entry(&enquete, AuditEvent::EnqueteCreated, json!({
                    "title": enquete.title,
                    "options": options.len(),
                    "oneVotePerUnit": enquete.one_vote_per_unit,
                })),
            )
            .await;

        Ok(EnqueteWithOptions { enquete, options })
    }

    /// Get an enquete with its options.
    pub async fn get(&self, actor: &Actor, id: &str) -> AppResult<EnqueteWithOptions> {
        let enquete = self.enquete_repo.get_by_id(id).await?;
        actor.require_condo(&enquete.condo_id)?;
        let options = self.enquete_repo.find_options(id).await?;
        Ok(EnqueteWithOptions { enquete, options })
    }

    /// List a condominium's enquetes.
    pub async fn list(
        &self,
        actor: &Actor,
        condo_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<enquete::Model>> {
        let condo_id = actor.target_condo(condo_id)?;
        self.enquete_repo
            .find_by_condo(&condo_id, limit.min(MAX_PAGE_SIZE), offset)
            .await
    }

    /// Vote for an option on behalf of the actor's unit.
    ///
    /// On a one-vote-per-unit enquete a unit holds a single vote across all
    /// options; a second vote is rejected with the option already chosen.
    pub async fn vote(
        &self,
        actor: &Actor,
        enquete_id: &str,
        option_id: &str,
        unit_id: Option<&str>,
        client: &ClientInfo,
    ) -> AppResult<enquete_vote::Model> {
        actor.require(Permission::CastVote)?;
        let unit_id = actor.own_unit(unit_id)?;

        let enquete = self.enquete_repo.get_by_id(enquete_id).await?;
        actor.require_condo(&enquete.condo_id)?;

        if !enquete.is_open_at(Utc::now().into()) {
            return Err(AppError::InvalidState(
                "A enquete não está aberta".to_string(),
            ));
        }

        self.enquete_repo
            .find_option(enquete_id, option_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Opção não encontrada: {option_id}")))?;

        let vote = enquete_vote::Model {
            id: self.id_gen.generate(),
            enquete_id: enquete.id.clone(),
            option_id: option_id.to_string(),
            unit_id: unit_id.clone(),
            user_id: actor.user_id.clone(),
            exclusive_unit_id: enquete.one_vote_per_unit.then(|| unit_id.clone()),
            created_at: Utc::now().into(),
        };

        let inserted = self
            .enquete_repo
            .insert_vote_if_absent(enquete_vote::ActiveModel {
                id: Set(vote.id.clone()),
                enquete_id: Set(vote.enquete_id.clone()),
                option_id: Set(vote.option_id.clone()),
                unit_id: Set(vote.unit_id.clone()),
                user_id: Set(vote.user_id.clone()),
                exclusive_unit_id: Set(vote.exclusive_unit_id.clone()),
                created_at: Set(vote.created_at),
            })
            .await?;

        if !inserted {
            let existing = self.enquete_repo.find_unit_vote(enquete_id, &unit_id).await?;
            return Err(match existing {
                Some(existing) => AppError::AlreadyVoted {
                    message: "Sua unidade já votou nesta enquete".to_string(),
                    existing_choice: existing.option_id,
                },
                None => AppError::Conflict("Sua unidade já votou nesta enquete".to_string()),
            });
        }

        tracing::info!(enquete_id = %enquete.id, option_id = %option_id, unit_id = %unit_id, "Enquete vote cast");

        self.audit
            .record(
                actor,
                client,
                enquete_entry(&enquete, AuditEvent::EnqueteVoted, json!({
                    "voteId": vote.id,
                    "optionId": option_id,
                    "unitId": unit_id,
                })),
            )
            .await;

        Ok(vote)
    }

    /// Vote counts per option, in display order.
    pub async fn results(&self, actor: &Actor, enquete_id: &str) -> AppResult<EnqueteResults> {
        let enquete = self.enquete_repo.get_by_id(enquete_id).await?;
        actor.require_condo(&enquete.condo_id)?;

        let options = self.enquete_repo.find_options(enquete_id).await?;
        let counts: HashMap<String, i64> = self
            .enquete_repo
            .count_by_option(enquete_id)
            .await?
            .into_iter()
            .map(|c| (c.option_id, c.count))
            .collect();

        let options: Vec<OptionResult> = options
            .into_iter()
            .map(|o| OptionResult {
                count: counts.get(&o.id).copied().unwrap_or(0),
                option_id: o.id,
                label: o.label,
            })
            .collect();
        let total = options.iter().map(|o| o.count).sum();

        Ok(EnqueteResults {
            enquete_id: enquete.id,
            options,
            total,
        })
    }
}

/// Trim option labels and enforce count and length limits.
fn normalize_options(options: &[String]) -> AppResult<Vec<String>> {
    if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
        return Err(AppError::Validation(format!(
            "A enquete deve ter entre {MIN_OPTIONS} e {MAX_OPTIONS} opções"
        )));
    }

    options
        .iter()
        .map(|label| {
            let label = label.trim();
            if label.is_empty() {
                Err(AppError::Validation(
                    "As opções não podem ser vazias".to_string(),
                ))
            } else if label.chars().count() > MAX_OPTION_LEN {
                Err(AppError::Validation(format!(
                    "Opção muito longa (máximo {MAX_OPTION_LEN} caracteres)"
                )))
            } else {
                Ok(label.to_string())
            }
        })
        .collect()
}

fn enquete_entry(
    enquete: &enquete::Model,
    event: AuditEvent,
    details: serde_json::Value,
) -> AuditEntry {
    AuditEntry {
        condo_id: enquete.condo_id.clone(),
        assembly_id: None,
        event,
        target_type: "enquete",
        target_id: enquete.id.clone(),
        details,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use chrono::Duration;
    use condovote_db::entities::profile::Role;
    use condovote_db::repositories::{AssemblyRepository, AuditLogRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn service(enquete_db: Arc<DatabaseConnection>) -> EnqueteService {
        EnqueteService::new(
            EnqueteRepository::new(enquete_db),
            AuditService::new(
                AuditLogRepository::new(fixtures::exec_db(1)),
                AssemblyRepository::new(fixtures::empty_db()),
            ),
        )
    }

    fn create_input(options: &[&str]) -> CreateEnqueteInput {
        let now = Utc::now();
        CreateEnqueteInput {
            condo_id: None,
            title: "Cor da fachada".to_string(),
            description: None,
            options: options.iter().map(|o| (*o).to_string()).collect(),
            one_vote_per_unit: true,
            start_at: now,
            end_at: now + Duration::days(7),
        }
    }

    #[test]
    fn test_normalize_options() {
        let labels = normalize_options(&[" Azul ".to_string(), "Verde".to_string()]).unwrap();
        assert_eq!(labels, vec!["Azul", "Verde"]);

        assert!(normalize_options(&["Só uma".to_string()]).is_err());
        assert!(normalize_options(&["A".to_string(), "  ".to_string()]).is_err());
        let too_many: Vec<String> = (0..=MAX_OPTIONS).map(|i| i.to_string()).collect();
        assert!(normalize_options(&too_many).is_err());
    }

    #[tokio::test]
    async fn test_create_assigns_option_ids_and_positions() {
        let enquete_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([fixtures::exec(1), fixtures::exec(2)])
                .into_connection(),
        );
        let service = service(enquete_db);
        let sindico = fixtures::actor(Role::Sindico, None);

        let created = service
            .create(&sindico, create_input(&["Azul", "Verde"]), &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(created.options.len(), 2);
        assert_eq!(created.options[0].position, 0);
        assert_eq!(created.options[1].position, 1);
        assert_ne!(created.options[0].id, created.options[1].id);
        assert!(created.options.iter().all(|o| o.enquete_id == created.enquete.id));
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let service = service(fixtures::empty_db());
        let morador = fixtures::actor(Role::Morador, Some("101"));

        let result = service
            .create(&morador, create_input(&["A", "B"]), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_inverted_window() {
        let service = service(fixtures::empty_db());
        let sindico = fixtures::actor(Role::Sindico, None);
        let mut input = create_input(&["A", "B"]);
        input.end_at = input.start_at - Duration::hours(1);

        let result = service.create(&sindico, input, &ClientInfo::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_vote_outside_window_is_invalid_state() {
        let mut closed = fixtures::enquete("e1", true);
        closed.end_at = (Utc::now() - Duration::minutes(1)).into();
        let enquete_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[closed]])
                .into_connection(),
        );
        let service = service(enquete_db);
        let morador = fixtures::actor(Role::Morador, Some("101"));

        let result = service
            .vote(&morador, "e1", "opt-a", None, &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_vote_unknown_option() {
        let enquete_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::enquete("e1", true)]])
                .append_query_results([Vec::<enquete_option::Model>::new()])
                .into_connection(),
        );
        let service = service(enquete_db);
        let morador = fixtures::actor(Role::Morador, Some("101"));

        let result = service
            .vote(&morador, "e1", "opt-z", None, &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_vote_then_switch_option_conflicts() {
        let enquete_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::enquete("e1", true)]])
                .append_query_results([[fixtures::option("opt-b", "e1", 1)]])
                .append_exec_results([fixtures::exec(0)])
                .append_query_results([[enquete_vote::Model {
                    id: "ev1".to_string(),
                    enquete_id: "e1".to_string(),
                    option_id: "opt-a".to_string(),
                    unit_id: "101".to_string(),
                    user_id: "u1".to_string(),
                    exclusive_unit_id: Some("101".to_string()),
                    created_at: Utc::now().into(),
                }]])
                .into_connection(),
        );
        let service = service(enquete_db);
        let morador = fixtures::actor(Role::Morador, Some("101"));

        let result = service
            .vote(&morador, "e1", "opt-b", None, &ClientInfo::default())
            .await;

        match result {
            Err(AppError::AlreadyVoted {
                existing_choice, ..
            }) => assert_eq!(existing_choice, "opt-a"),
            other => panic!("expected AlreadyVoted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_vote_on_open_enquete_leaves_exclusive_slot_empty() {
        let enquete_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::enquete("e1", false)]])
                .append_query_results([[fixtures::option("opt-a", "e1", 0)]])
                .append_exec_results([fixtures::exec(1)])
                .into_connection(),
        );
        let service = service(enquete_db);
        let morador = fixtures::actor(Role::Morador, Some("101"));

        let vote = service
            .vote(&morador, "e1", "opt-a", None, &ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(vote.exclusive_unit_id, None);
        assert_eq!(vote.unit_id, "101");
    }

    #[tokio::test]
    async fn test_results_include_zero_counts() {
        let enquete_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[fixtures::enquete("e1", true)]])
                .append_query_results([[
                    fixtures::option("opt-a", "e1", 0),
                    fixtures::option("opt-b", "e1", 1),
                ]])
                .append_query_results([[maplit::btreemap! {
                    "option_id" => Value::String(Some(Box::new("opt-a".to_string()))),
                    "count" => Value::BigInt(Some(1)),
                }]])
                .into_connection(),
        );
        let service = service(enquete_db);
        let morador = fixtures::actor(Role::Morador, Some("101"));

        let results = service.results(&morador, "e1").await.unwrap();

        let counts: Vec<(&str, i64)> = results
            .options
            .iter()
            .map(|o| (o.option_id.as_str(), o.count))
            .collect();
        assert_eq!(counts, vec![("opt-a", 1), ("opt-b", 0)]);
        assert_eq!(results.total, 1);
    }
}
