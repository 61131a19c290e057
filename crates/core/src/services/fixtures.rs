//! Shared model builders for service tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use condovote_db::entities::{
    assembly::{self, AssemblyStatus},
    enquete, enquete_option,
    pauta::{self, PautaStatus, QuorumType},
    presence,
    profile::Role,
    unit,
    vote::{self, VoteChoice, VoteOrigin},
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};

use crate::services::access::Actor;

pub fn empty_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// Connection that accepts `n` writes.
pub fn exec_db(n: usize) -> Arc<DatabaseConnection> {
    Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results((0..n).map(|_| exec(1)))
            .into_connection(),
    )
}

pub const fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

pub fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
    maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }
}

pub fn actor(role: Role, unit_id: Option<&str>) -> Actor {
    Actor {
        user_id: "u1".to_string(),
        role,
        condo_id: "condo1".to_string(),
        unit_id: unit_id.map(str::to_string),
    }
}

pub fn assembly(id: &str, status: AssemblyStatus) -> assembly::Model {
    assembly::Model {
        id: id.to_string(),
        condo_id: "condo1".to_string(),
        title: "AGO 2025".to_string(),
        description: None,
        scheduled_at: Utc::now().into(),
        meeting_link: None,
        require_presence: false,
        block_defaulters: false,
        status,
        minutes_url: None,
        created_by: "admin1".to_string(),
        created_at: Utc::now().into(),
        opened_at: None,
        closed_at: None,
    }
}

pub fn pauta(id: &str, order_index: i32, status: PautaStatus) -> pauta::Model {
    pauta::Model {
        id: id.to_string(),
        assembly_id: "a1".to_string(),
        title: format!("Pauta {order_index}"),
        description: None,
        quorum_type: QuorumType::Simple,
        quorum_custom: None,
        order_index,
        status,
        created_at: Utc::now().into(),
        opened_at: None,
        closed_at: None,
    }
}

pub fn vote(pauta_id: &str, unit_id: &str, choice: VoteChoice) -> vote::Model {
    vote::Model {
        id: format!("v-{unit_id}"),
        pauta_id: pauta_id.to_string(),
        unit_id: unit_id.to_string(),
        user_id: "u1".to_string(),
        choice,
        origin: VoteOrigin::Web,
        ip: None,
        user_agent: None,
        created_at: Utc::now().into(),
    }
}

pub fn unit(id: &str, is_defaulter: bool) -> unit::Model {
    unit::Model {
        id: id.to_string(),
        condo_id: "condo1".to_string(),
        block: Some("A".to_string()),
        number: id.to_string(),
        is_defaulter,
        created_at: Utc::now().into(),
    }
}

pub fn presence(assembly_id: &str, unit_id: &str) -> presence::Model {
    presence::Model {
        id: format!("pr-{unit_id}"),
        assembly_id: assembly_id.to_string(),
        unit_id: unit_id.to_string(),
        confirmed_by: "u1".to_string(),
        confirmed_at: Utc::now().into(),
    }
}

/// Enquete whose voting window contains now.
pub fn enquete(id: &str, one_vote_per_unit: bool) -> enquete::Model {
    let now = Utc::now();
    enquete::Model {
        id: id.to_string(),
        condo_id: "condo1".to_string(),
        title: "Cor da fachada".to_string(),
        description: None,
        one_vote_per_unit,
        start_at: (now - Duration::hours(1)).into(),
        end_at: (now + Duration::hours(1)).into(),
        created_by: "admin1".to_string(),
        created_at: now.into(),
    }
}

pub fn option(id: &str, enquete_id: &str, position: i32) -> enquete_option::Model {
    enquete_option::Model {
        id: id.to_string(),
        enquete_id: enquete_id.to_string(),
        label: format!("Opção {id}"),
        position,
    }
}
