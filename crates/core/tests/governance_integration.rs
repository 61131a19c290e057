//! End-to-end governance scenarios against `PostgreSQL`.
//!
//! Run with: `cargo test -p condovote-core --test governance_integration -- --ignored`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use condovote_common::{AppError, AuditMode};
use condovote_core::{
    Actor, AssemblyService, AuditService, CastVoteInput, ClientInfo, CreateAssemblyInput,
    CreateEnqueteInput, CreatePautaInput, EnqueteService, PautaService, PresenceService,
    VoteService,
};
use condovote_db::entities::{
    audit_log::AuditEvent, pauta::QuorumType, profile::Role, unit, vote::VoteChoice,
};
use condovote_db::repositories::{
    AssemblyRepository, AuditLogRepository, EnqueteRepository, PautaRepository,
    PresenceRepository, UnitRepository, VoteRepository,
};
use condovote_db::test_utils::TestDatabase;
use sea_orm::{DatabaseConnection, Set};

struct Services {
    assemblies: AssemblyService,
    pautas: PautaService,
    votes: VoteService,
    presence: PresenceService,
    enquetes: EnqueteService,
    audit_repo: AuditLogRepository,
}

fn services(db: &Arc<DatabaseConnection>, audit_mode: AuditMode) -> Services {
    let assembly_repo = AssemblyRepository::new(Arc::clone(db));
    let pauta_repo = PautaRepository::new(Arc::clone(db));
    let vote_repo = VoteRepository::new(Arc::clone(db));
    let presence_repo = PresenceRepository::new(Arc::clone(db));
    let unit_repo = UnitRepository::new(Arc::clone(db));
    let audit_repo = AuditLogRepository::new(Arc::clone(db));
    let audit = AuditService::new(audit_repo.clone(), assembly_repo.clone());

    Services {
        assemblies: AssemblyService::new(assembly_repo.clone(), pauta_repo.clone(), audit.clone()),
        pautas: PautaService::new(
            pauta_repo.clone(),
            assembly_repo.clone(),
            vote_repo.clone(),
            audit.clone(),
        ),
        votes: VoteService::new(
            vote_repo,
            pauta_repo,
            assembly_repo.clone(),
            presence_repo.clone(),
            unit_repo.clone(),
            audit.clone(),
        )
        .with_audit_mode(audit_mode),
        presence: PresenceService::new(presence_repo, assembly_repo, unit_repo, audit.clone()),
        enquetes: EnqueteService::new(EnqueteRepository::new(Arc::clone(db)), audit),
        audit_repo,
    }
}

fn actor(user_id: &str, role: Role, unit_id: Option<&str>) -> Actor {
    Actor {
        user_id: user_id.to_string(),
        role,
        condo_id: "condo1".to_string(),
        unit_id: unit_id.map(str::to_string),
    }
}

async fn seed_units(db: &Arc<DatabaseConnection>, ids: &[&str]) {
    let repo = UnitRepository::new(Arc::clone(db));
    for id in ids {
        repo.create(unit::ActiveModel {
            id: Set((*id).to_string()),
            condo_id: Set("condo1".to_string()),
            block: Set(None),
            number: Set((*id).to_string()),
            is_defaulter: Set(false),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    }
}

/// Open assembly with one pauta in voting. Returns `(assembly_id, pauta_id)`.
async fn open_voting(s: &Services, sindico: &Actor, require_presence: bool) -> (String, String) {
    let client = ClientInfo::default();
    let assembly = s
        .assemblies
        .create(
            sindico,
            CreateAssemblyInput {
                condo_id: None,
                title: "AGE".to_string(),
                description: None,
                scheduled_at: Utc::now(),
                meeting_link: None,
                require_presence,
                block_defaulters: false,
            },
            &client,
        )
        .await
        .unwrap();
    s.assemblies.open(sindico, &assembly.id, &client).await.unwrap();

    let pauta = s
        .pautas
        .create(
            sindico,
            CreatePautaInput {
                assembly_id: assembly.id.clone(),
                title: "Troca do portão".to_string(),
                description: None,
                quorum_type: QuorumType::Simple,
                quorum_custom: None,
            },
            &client,
        )
        .await
        .unwrap();
    s.pautas.open(sindico, &pauta.id, &client).await.unwrap();

    (assembly.id, pauta.id)
}

fn cast(pauta_id: &str, choice: &str) -> CastVoteInput {
    CastVoteInput {
        pauta_id: pauta_id.to_string(),
        choice: choice.to_string(),
        origin: None,
        unit_id: None,
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_lifecycle_and_final_tally() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = test_db.shared();
    seed_units(&db, &["101", "102"]).await;
    let s = services(&db, AuditMode::BestEffort);
    let sindico = actor("admin", Role::Sindico, None);
    let u1 = actor("m1", Role::Morador, Some("101"));
    let u2 = actor("m2", Role::Morador, Some("102"));
    let client = ClientInfo::default();

    let (_, pauta_id) = open_voting(&s, &sindico, false).await;

    let vote = s.votes.cast(&u1, cast(&pauta_id, "yes"), &client).await.unwrap();
    assert_eq!(vote.choice, VoteChoice::Yes);

    let again = s.votes.cast(&u1, cast(&pauta_id, "no"), &client).await;
    assert!(matches!(
        again,
        Err(AppError::AlreadyVoted { ref existing_choice, .. }) if existing_choice == "yes"
    ));

    s.pautas.close(&sindico, &pauta_id, &client).await.unwrap();
    let tally = s.pautas.tally(&sindico, &pauta_id).await.unwrap();
    assert_eq!((tally.yes, tally.no, tally.abstain, tally.total), (1, 0, 0, 1));

    let late = s.votes.cast(&u2, cast(&pauta_id, "no"), &client).await;
    assert!(matches!(late, Err(AppError::InvalidState(_))));

    let trail = s.audit_repo.find_by_target("pauta", &pauta_id).await.unwrap();
    let events: Vec<AuditEvent> = trail.iter().map(|e| e.event_type).collect();
    assert_eq!(
        events,
        vec![
            AuditEvent::PautaCreated,
            AuditEvent::PautaOpened,
            AuditEvent::VoteCast,
            AuditEvent::PautaClosed,
        ]
    );

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_concurrent_double_cast_yields_one_success() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = test_db.shared();
    seed_units(&db, &["101"]).await;
    let s = services(&db, AuditMode::Atomic);
    let sindico = actor("admin", Role::Sindico, None);
    let morador = actor("m1", Role::Morador, Some("101"));
    let client = ClientInfo::default();

    let (_, pauta_id) = open_voting(&s, &sindico, false).await;

    let (first, second) = tokio::join!(
        s.votes.cast(&morador, cast(&pauta_id, "yes"), &client),
        s.votes.cast(&morador, cast(&pauta_id, "no"), &client),
    );

    let successes = [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    assert!(
        matches!(first, Err(AppError::AlreadyVoted { .. }))
            || matches!(second, Err(AppError::AlreadyVoted { .. }))
    );

    let tally = s.pautas.tally(&sindico, &pauta_id).await.unwrap();
    assert_eq!(tally.total, 1);

    let vote_entries = s
        .audit_repo
        .find_by_target("pauta", &pauta_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type == AuditEvent::VoteCast)
        .count();
    assert_eq!(vote_entries, 1);

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_presence_gating() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = test_db.shared();
    seed_units(&db, &["101"]).await;
    let s = services(&db, AuditMode::BestEffort);
    let sindico = actor("admin", Role::Sindico, None);
    let morador = actor("m1", Role::Morador, Some("101"));
    let client = ClientInfo::default();

    let (assembly_id, pauta_id) = open_voting(&s, &sindico, true).await;

    let blocked = s.votes.cast(&morador, cast(&pauta_id, "yes"), &client).await;
    assert!(matches!(blocked, Err(AppError::Forbidden(_))));

    let first = s.presence.confirm(&morador, &assembly_id, None, &client).await.unwrap();
    let second = s.presence.confirm(&morador, &assembly_id, None, &client).await.unwrap();
    assert!(first.newly_confirmed);
    assert!(!second.newly_confirmed);
    assert_eq!(first.presence.id, second.presence.id);

    assert!(s.votes.cast(&morador, cast(&pauta_id, "yes"), &client).await.is_ok());

    let confirmations = s
        .audit_repo
        .find_by_target("unit", "101")
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.event_type == AuditEvent::PresenceConfirmed)
        .count();
    assert_eq!(confirmations, 1);

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_order_index_is_monotonic() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = test_db.shared();
    let s = services(&db, AuditMode::BestEffort);
    let sindico = actor("admin", Role::Sindico, None);
    let client = ClientInfo::default();

    let (assembly_id, _) = open_voting(&s, &sindico, false).await;
    for title in ["Segunda", "Terceira", "Quarta"] {
        s.pautas
            .create(
                &sindico,
                CreatePautaInput {
                    assembly_id: assembly_id.clone(),
                    title: title.to_string(),
                    description: None,
                    quorum_type: QuorumType::Simple,
                    quorum_custom: None,
                },
                &client,
            )
            .await
            .unwrap();
    }

    let listed = s.pautas.list(&sindico, &assembly_id).await.unwrap();
    let order: Vec<i32> = listed.iter().map(|p| p.pauta.order_index).collect();
    assert_eq!(order, vec![0, 1, 2, 3]);

    test_db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_exclusive_enquete_rejects_switching_option() {
    let test_db = TestDatabase::create_unique().await.unwrap();
    let db = test_db.shared();
    let s = services(&db, AuditMode::BestEffort);
    let sindico = actor("admin", Role::Sindico, None);
    let morador = actor("m1", Role::Morador, Some("101"));
    let client = ClientInfo::default();

    let created = s
        .enquetes
        .create(
            &sindico,
            CreateEnqueteInput {
                condo_id: None,
                title: "Horário da piscina".to_string(),
                description: None,
                options: vec!["A".to_string(), "B".to_string()],
                one_vote_per_unit: true,
                start_at: Utc::now() - Duration::minutes(1),
                end_at: Utc::now() + Duration::days(1),
            },
            &client,
        )
        .await
        .unwrap();
    let (a, b) = (&created.options[0].id, &created.options[1].id);

    s.enquetes
        .vote(&morador, &created.enquete.id, a, None, &client)
        .await
        .unwrap();
    let switched = s
        .enquetes
        .vote(&morador, &created.enquete.id, b, None, &client)
        .await;
    assert!(matches!(switched, Err(AppError::AlreadyVoted { .. })));

    let results = s.enquetes.results(&morador, &created.enquete.id).await.unwrap();
    let counts: Vec<i64> = results.options.iter().map(|o| o.count).collect();
    assert_eq!(counts, vec![1, 0]);

    test_db.drop_database().await.unwrap();
}
