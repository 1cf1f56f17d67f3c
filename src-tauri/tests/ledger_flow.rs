mod common;

use cims_tauri::catalog::{CLIENT_PROJECT, EQUIPMENT_STOCK, EQUIPMENT_TYPE};
use cims_tauri::page::{Modal, ToastLevel};
use cims_tauri::transport::{Method, RequestBody};
use cims_tauri::{ConsoleError, Pane, UiEvent};
use common::Harness;
use serde_json::json;

const STOCK_HISTORY: &str = "/equipment/equipmentStockHistory/getAllByEquipmentStock/21";
const STOCK_HEADER: &str = "/equipment/equipmentStock/getById/21";

fn stock_page(harness: &Harness) -> std::sync::Arc<cims_tauri::PageController> {
    for path in [
        "/equipment/equipmentType/getAllActive",
        "/equipment/equipmentSupplier/getAllActive",
        "/equipment/equipmentStock/getAll",
    ] {
        harness.transport.get_ok(path, json!([]));
    }
    let page = harness.page(&EQUIPMENT_STOCK);
    page.open().expect("open");
    page
}

#[test]
fn stock_ledger_opens_with_history_and_header() {
    let harness = Harness::logged_in();
    let page = stock_page(&harness);
    harness.transport.get_ok(
        STOCK_HISTORY,
        json!([{"id": 1, "stockNumber": "S-21", "operation": "ADD", "equipmentQuantity": 10, "historyNote": "opening", "date": "2026-01-04"}]),
    );
    harness.transport.get_ok(
        STOCK_HEADER,
        json!({"id": 21, "equipmentNumber": "EQ-3", "equipmentName": "Bosch GSB", "availableQuantity": 10}),
    );

    page.open_ledger("21").expect("open ledger");

    let ledger = page.view().ledger.expect("ledger view");
    assert_eq!(ledger.title, "Equipment Stock History Details");
    let table = ledger.grid.as_ref().and_then(|grid| grid.table()).expect("table");
    assert_eq!(
        table.rows[0].cells,
        vec!["S-21", "ADD", "10", "opening", "2026-01-04"]
    );
    assert!(table.columns.iter().all(|column| !column.actions));
    assert_eq!(page.form_value(Pane::Ledger, "equipmentStockId").as_deref(), Some("21"));
    assert_eq!(page.form_value(Pane::Ledger, "equipmentName").as_deref(), Some("Bosch GSB"));
    assert_eq!(page.form_value(Pane::Ledger, "availableQuantity").as_deref(), Some("10"));
}

#[test]
fn stock_entry_save_clears_the_entry_and_reopens() {
    let harness = Harness::logged_in();
    let page = stock_page(&harness);
    harness.transport.get_ok(STOCK_HISTORY, json!([]));
    harness.transport.get_ok(
        STOCK_HEADER,
        json!({"id": 21, "equipmentNumber": "EQ-3", "equipmentName": "Bosch GSB", "availableQuantity": 10}),
    );
    harness.transport.ok(
        Method::Post,
        "/equipment/equipmentStockHistory/saveUpdate",
        json!(null),
    );
    page.open_ledger("21").expect("open ledger");

    page.set_field(Pane::Ledger, "operation", "ADD").expect("operation");
    page.set_field(Pane::Ledger, "equipmentQuantity", " 5 ").expect("quantity");
    page.set_field(Pane::Ledger, "historyNote", "restock").expect("note");
    page.save_ledger_entry().expect("save entry");

    let request = harness
        .transport
        .last_to(Method::Post, "/equipment/equipmentStockHistory/saveUpdate")
        .expect("save request");
    assert_eq!(
        request.body,
        RequestBody::Json(json!({
            "equipmentStockId": "21",
            "availableQuantity": "10",
            "operation": "ADD",
            "equipmentQuantity": "5",
            "historyNote": "restock"
        }))
    );
    assert!(matches!(
        page.take_events().first(),
        Some(UiEvent::Toast {
            level: ToastLevel::Success,
            ..
        })
    ));
    assert_eq!(harness.transport.calls_to(Method::Get, STOCK_HISTORY), 2);
    assert_eq!(harness.transport.calls_to(Method::Get, STOCK_HEADER), 2);
    assert_eq!(page.form_value(Pane::Ledger, "operation").as_deref(), Some("NONE"));
    assert_eq!(page.form_value(Pane::Ledger, "historyNote").as_deref(), Some(""));
    assert_eq!(page.form_value(Pane::Ledger, "equipmentStockId").as_deref(), Some("21"));
}

#[test]
fn project_ledger_resolves_stock_from_the_picked_equipment() {
    let harness = Harness::logged_in();
    for path in [
        "/project/project/getAllActive",
        "/client/client/getAllActive",
        "/project/clientProject/getAll",
        "/project/clientProjectStock/getAllByClientProject/8",
    ] {
        harness.transport.get_ok(path, json!([]));
    }
    harness.transport.get_ok(
        "/equipment/equipmentType/getAllActive",
        json!([{"id": 3, "equipmentType": "Drill"}]),
    );
    harness.transport.get_ok(
        "/equipment/equipment/getAllActiveByEquipmentType/3",
        json!([{"id": 11, "equipmentName": "Bosch GSB"}]),
    );
    harness.transport.get_ok(
        "/equipment/equipmentStock/getByEquipmentId/11",
        json!({"id": 30, "availableQuantity": 12}),
    );
    harness.transport.ok(
        Method::Post,
        "/project/clientProjectStock/saveUpdate",
        json!(null),
    );
    let page = harness.page(&CLIENT_PROJECT);
    page.open().expect("open");

    page.open_ledger("8").expect("open ledger");
    assert_eq!(
        page.options(Pane::Ledger, "equipmentTypeId").expect("types").len(),
        1
    );
    page.select_changed(Pane::Ledger, "equipmentTypeId", "3").expect("type");
    page.select_changed(Pane::Ledger, "equipmentId", "11").expect("equipment");
    assert_eq!(page.form_value(Pane::Ledger, "equipmentStockId").as_deref(), Some("30"));
    assert_eq!(page.form_value(Pane::Ledger, "availableQuantity").as_deref(), Some("12"));

    page.set_field(Pane::Ledger, "operation", "REMOVE").expect("operation");
    page.set_field(Pane::Ledger, "equipmentQuantity", "2").expect("quantity");
    page.set_field(Pane::Ledger, "stockNote", "site").expect("note");
    page.save_ledger_entry().expect("save entry");

    let request = harness
        .transport
        .last_to(Method::Post, "/project/clientProjectStock/saveUpdate")
        .expect("save request");
    assert_eq!(
        request.body,
        RequestBody::Json(json!({
            "clientProjectId": "8",
            "equipmentId": "11",
            "equipmentStockId": "30",
            "availableQuantity": "12",
            "operation": "REMOVE",
            "equipmentQuantity": "2",
            "stockNote": "site"
        }))
    );
    assert_eq!(
        page.options(Pane::Ledger, "equipmentTypeId").expect("types").len(),
        1
    );
}

#[test]
fn closing_the_ledger_drops_its_state() {
    let harness = Harness::logged_in();
    let page = stock_page(&harness);
    harness.transport.get_ok(STOCK_HISTORY, json!([]));
    harness.transport.get_ok(STOCK_HEADER, json!({"id": 21}));
    page.open_ledger("21").expect("open ledger");
    page.take_events();

    page.close_ledger();

    let view = page.view();
    assert!(view.ledger.is_none());
    assert_eq!(
        view.events,
        vec![UiEvent::CloseModal {
            modal: Modal::Ledger
        }]
    );
    let err = page.save_ledger_entry().expect_err("closed");
    assert!(matches!(err, ConsoleError::Input(_)));
}

#[test]
fn pages_without_ledger_refuse_to_open_one() {
    let harness = Harness::logged_in();
    harness
        .transport
        .get_ok("/equipment/equipmentType/getAll", json!([]));
    let page = harness.page(&EQUIPMENT_TYPE);
    page.open().expect("open");
    let before = harness.transport.count();

    let err = page.open_ledger("7").expect_err("no ledger");

    assert!(matches!(err, ConsoleError::Input(_)));
    assert_eq!(harness.transport.count(), before);
}
