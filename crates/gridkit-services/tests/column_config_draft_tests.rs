//! Integration tests for the column configuration dialog workflow
//!
//! Drives ColumnConfigDraft through a ColumnConfigStore backed by
//! MockTransport: live-status refresh, add-missing, sync, the confirmed
//! delete path and save.

mod common;

use std::sync::Arc;

use gridkit_core::{ColumnDefinition, ColumnSet, ColumnType};
use gridkit_services::{
    ColumnConfig, ColumnConfigDraft, ColumnConfigStore, ColumnDefTransport, DeleteRequest,
    Presence, ServiceError,
};
use pretty_assertions::assert_eq;

use common::MockTransport;

fn store_for(transport: &Arc<MockTransport>) -> ColumnConfigStore {
    ColumnConfigStore::new(transport.clone() as Arc<dyn ColumnDefTransport>)
}

fn draft() -> ColumnConfigDraft {
    let columns = ColumnSet::new(vec![
        ColumnDefinition::new("id"),
        ColumnDefinition::new("name").editable(),
        ColumnDefinition::new("email").editable(),
        ColumnDefinition::new("actions").column_type(ColumnType::Actions),
    ]);
    ColumnConfigDraft::new("users", "users", ColumnConfig::new("Users", columns))
}

fn fields(draft: &ColumnConfigDraft) -> Vec<String> {
    draft.columns().columns().iter().map(|c| c.field.clone()).collect()
}

// ============ refresh_db_status Tests ============

#[tokio::test]
async fn refresh_checks_data_columns_only() {
    let transport = Arc::new(MockTransport::new().with_live_columns(&[("id", "integer"), ("name", "text")]));
    let store = store_for(&transport);
    let mut draft = draft();

    draft.refresh_db_status(&store).await.unwrap();

    // protected and actions columns are never sent
    assert_eq!(transport.call_log(), vec!["check users name,email"]);
    assert_eq!(draft.presence("name"), Presence::Present);
    assert_eq!(draft.presence("email"), Presence::Absent);
    assert_eq!(draft.presence("id"), Presence::Unknown);

    let missing: Vec<&str> = draft.missing_columns().iter().map(|c| c.field.as_str()).collect();
    assert_eq!(missing, vec!["email"]);
}

#[tokio::test]
async fn refresh_failure_leaves_status_untouched() {
    let transport = Arc::new(MockTransport::new().with_failure());
    let store = store_for(&transport);
    let mut draft = draft();

    assert!(draft.refresh_db_status(&store).await.is_err());
    assert!(draft.db_status().is_empty());
}

#[tokio::test]
async fn refresh_with_only_protected_columns_makes_no_request() {
    let transport = Arc::new(MockTransport::new().with_live_columns(&[("id", "integer")]));
    let store = store_for(&transport);
    let columns = ColumnSet::new(vec![ColumnDefinition::new("id"), ColumnDefinition::new("created_at")]);
    let mut draft = ColumnConfigDraft::new("audit", "audit", ColumnConfig::new("Audit", columns));

    draft.refresh_db_status(&store).await.unwrap();
    assert_eq!(transport.call_count(), 0);
    assert!(draft.db_status().is_empty());
}

// ============ add_missing_to_db Tests ============

#[tokio::test]
async fn add_missing_marks_added_fields_present() {
    let transport = Arc::new(MockTransport::new().with_live_columns(&[("id", "integer")]));
    let store = store_for(&transport);
    let mut draft = draft();
    draft.refresh_db_status(&store).await.unwrap();

    let outcome = draft.add_missing_to_db(&store).await.unwrap();
    assert_eq!(outcome.added_columns, vec!["name", "email"]);
    assert!(outcome.is_complete());
    assert_eq!(draft.presence("name"), Presence::Present);
    assert_eq!(draft.presence("email"), Presence::Present);
    assert!(draft.missing_columns().is_empty());
}

#[tokio::test]
async fn add_missing_reports_partial_failure() {
    let transport = Arc::new(
        MockTransport::new()
            .with_live_columns(&[("id", "integer")])
            .with_add_failure("email", "invalid type"),
    );
    let store = store_for(&transport);
    let mut draft = draft();
    draft.refresh_db_status(&store).await.unwrap();

    let outcome = draft.add_missing_to_db(&store).await.unwrap();
    assert_eq!(outcome.added_columns, vec!["name"]);
    assert_eq!(outcome.failed_columns[0].field, "email");
    assert_eq!(draft.presence("email"), Presence::Absent);
}

#[tokio::test]
async fn add_missing_with_nothing_missing_makes_no_request() {
    let transport = Arc::new(MockTransport::new());
    let store = store_for(&transport);
    let mut draft = draft();

    let outcome = draft.add_missing_to_db(&store).await.unwrap();
    assert!(outcome.added_columns.is_empty());
    assert_eq!(transport.call_count(), 0);
}

// ============ sync_from_db Tests ============

#[tokio::test]
async fn sync_appends_new_live_columns() {
    let transport = Arc::new(MockTransport::new().with_live_columns(&[
        ("id", "integer"),
        ("name", "text"),
        ("balance", "money"),
    ]));
    let store = store_for(&transport);
    let mut draft = draft();

    let added = draft.sync_from_db(&store).await.unwrap();
    assert_eq!(added, vec!["balance"]);
    assert_eq!(fields(&draft), vec!["id", "name", "email", "actions", "balance"]);
    assert_eq!(
        draft.columns().get("balance").unwrap().column_type,
        ColumnType::Currency
    );
    assert_eq!(draft.presence("balance"), Presence::Present);
}

// ============ delete Tests ============

#[tokio::test]
async fn confirmed_delete_drops_live_column_then_local() {
    let transport = Arc::new(MockTransport::new().with_live_columns(&[("name", "text"), ("email", "text")]));
    let store = store_for(&transport);
    let mut draft = draft();
    draft.refresh_db_status(&store).await.unwrap();

    let DeleteRequest::NeedsConfirmation(confirmation) = draft.request_delete("email").unwrap() else {
        panic!("live column should need confirmation");
    };
    // nothing changes before confirmation
    assert!(fields(&draft).contains(&"email".to_string()));
    assert_eq!(transport.live_fields(), vec!["name", "email"]);

    let removed = draft.confirm_db_delete(&store, &confirmation).await.unwrap();
    assert_eq!(removed.field, "email");
    assert_eq!(fields(&draft), vec!["id", "name", "actions"]);
    assert!(draft.form().columns.iter().all(|c| c.field != "email"));
    assert_eq!(transport.live_fields(), vec!["name"]);
    assert_eq!(draft.presence("email"), Presence::Unknown);
    assert!(draft.pending_delete().is_none());
}

#[tokio::test]
async fn failed_delete_keeps_column_locally() {
    let transport = Arc::new(
        MockTransport::new()
            .with_live_columns(&[("email", "text")])
            .with_rejected_delete(),
    );
    let store = store_for(&transport);
    let mut draft = draft();
    draft.refresh_db_status(&store).await.unwrap();

    let DeleteRequest::NeedsConfirmation(confirmation) = draft.request_delete("email").unwrap() else {
        panic!("live column should need confirmation");
    };
    let result = draft.confirm_db_delete(&store, &confirmation).await;
    assert!(matches!(result, Err(ServiceError::SchemaMutationFailed(_))));
    assert!(fields(&draft).contains(&"email".to_string()));
    assert_eq!(draft.presence("email"), Presence::Present);

    // the confirmation is spent
    let again = draft.confirm_db_delete(&store, &confirmation).await;
    assert!(matches!(again, Err(ServiceError::ConfirmationMismatch)));
}

#[tokio::test]
async fn stale_confirmation_is_rejected() {
    let transport = Arc::new(MockTransport::new().with_live_columns(&[("name", "text"), ("email", "text")]));
    let store = store_for(&transport);
    let mut draft = draft();
    draft.refresh_db_status(&store).await.unwrap();

    let DeleteRequest::NeedsConfirmation(first) = draft.request_delete("email").unwrap() else {
        panic!("live column should need confirmation");
    };
    let DeleteRequest::NeedsConfirmation(_second) = draft.request_delete("name").unwrap() else {
        panic!("live column should need confirmation");
    };

    let result = draft.confirm_db_delete(&store, &first).await;
    assert!(matches!(result, Err(ServiceError::ConfirmationMismatch)));
    assert_eq!(transport.live_fields(), vec!["name", "email"]);
    assert!(!transport.call_log().iter().any(|c| c.starts_with("delete")));
}

#[tokio::test]
async fn absent_column_is_removed_without_network() {
    let transport = Arc::new(MockTransport::new().with_live_columns(&[("name", "text")]));
    let store = store_for(&transport);
    let mut draft = draft();
    draft.refresh_db_status(&store).await.unwrap();
    let calls = transport.call_count();

    let request = draft.request_delete("email").unwrap();
    assert!(matches!(request, DeleteRequest::RemovedLocally(_)));
    assert_eq!(transport.call_count(), calls);
}

// ============ save Tests ============

#[tokio::test]
async fn save_persists_draft() {
    let transport = Arc::new(MockTransport::new());
    let store = store_for(&transport);
    let mut draft = draft();
    draft.set_page_title("People");
    draft.set_form_width(900);
    draft.remove_local("email").unwrap();

    let config = draft.save(&store).await.unwrap();
    assert_eq!(config.page_title, "People");
    assert_eq!(config.form.width, 900);

    let saved = transport.saved();
    assert_eq!(saved[0].page_title, "People");
    assert_eq!(saved[0].form_width, 900);
    let saved_fields: Vec<&str> = saved[0].columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(saved_fields, vec!["id", "name", "actions"]);
    let form_fields: Vec<&str> = saved[0].form_columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(form_fields, vec!["name"]);
}

#[tokio::test]
async fn save_failure_keeps_draft() {
    let transport = Arc::new(MockTransport::new().with_failure());
    let store = store_for(&transport);
    let mut draft = draft();
    draft.set_page_title("People");

    assert!(matches!(draft.save(&store).await, Err(ServiceError::SaveFailed(_))));
    assert_eq!(draft.config().page_title, "People");
}
