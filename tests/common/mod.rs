#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use backoffice_engine::{
    commands::{
        delivery::SuctionDraft,
        fund::{MemberDraft, RegisterMemberCommand},
    },
    models::{
        fund::Member,
        reference::{Branch, ReferenceData},
    },
    persistence::{FileBackend, Persistence},
    store::Workspace,
};

pub const BANG_NA: u32 = 1;
pub const RAYONG: u32 = 2;

pub fn reference() -> ReferenceData {
    ReferenceData::new(vec![
        Branch::new(BANG_NA, "Bang Na", "Bangkok"),
        Branch::new(RAYONG, "Rayong", "East"),
    ])
}

/// Workspace backed by memory only.
pub fn memory_workspace() -> Workspace {
    Workspace::in_memory(reference())
}

/// Workspace whose collections live as JSON files under `dir`. Two calls with
/// the same directory see each other's writes.
pub fn file_workspace(dir: &Path) -> Workspace {
    let backend = FileBackend::open(dir).expect("data dir can be created");
    Workspace::new(Persistence::new(Arc::new(backend)), reference())
}

pub fn suction_draft(date: &str, mode: &str, liters: &str) -> SuctionDraft {
    SuctionDraft {
        date: date.to_string(),
        branch_id: BANG_NA.to_string(),
        oil_type: "diesel".to_string(),
        mode: mode.to_string(),
        quantity_liters: liters.to_string(),
        notes: String::new(),
    }
}

pub fn register_member(workspace: &Workspace, code: &str, balance: &str) -> Member {
    workspace
        .execute(&RegisterMemberCommand {
            draft: MemberDraft {
                code: code.to_string(),
                name: format!("Member {}", code),
                department: "Operations".to_string(),
                opening_balance: balance.to_string(),
                joined_on: "2021-06-01".to_string(),
            },
        })
        .expect("member registers")
        .output
}

/// Every stored key with its raw payload, for before/after comparisons.
pub fn snapshot(workspace: &Workspace) -> Vec<(String, Option<String>)> {
    let backend = workspace.persistence().backend();
    backend
        .keys()
        .expect("keys are listable")
        .into_iter()
        .map(|key| {
            let value = backend.get(&key).expect("key is readable");
            (key, value)
        })
        .collect()
}
