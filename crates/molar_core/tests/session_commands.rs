use approx::assert_relative_eq;
use molar_core::session::IMPORT_FAILED;
use molar_core::{Command, Element, Payload, Session};
use std::fs;

fn add(session: &mut Session, symbol: &str, quantity: f64) {
    let response = session.dispatch(Command::AddEntry {
        symbol: symbol.to_string(),
        quantity,
    });
    assert!(response.ok, "{}", response.message);
}

#[test]
fn compute_returns_breakdown_and_formula() {
    let mut session = Session::open_in_memory().unwrap();
    add(&mut session, "H", 2.0);
    add(&mut session, "O", 1.0);

    let response = session.dispatch(Command::Compute);
    assert!(response.ok);
    assert_eq!(response.message, "Molar mass: 18.0150 g/mol");
    match response.payload {
        Payload::Computation(view) => {
            assert_eq!(view.formula, "H₍2.0₎ + O");
            assert_eq!(view.name, None);
            assert_relative_eq!(view.result.total_mass, 18.015, epsilon = 1e-9);
            assert_eq!(view.result.breakdown.len(), 2);
        }
        other => panic!("unexpected payload: {other:?}"),
    }
}

#[test]
fn failures_are_reported_not_raised() {
    let mut session = Session::open_in_memory().unwrap();

    let response = session.dispatch(Command::Compute);
    assert!(!response.ok);
    assert_eq!(response.message, "compute failed: element list is empty");
    assert_eq!(response.payload, Payload::None);

    let response = session.dispatch(Command::AddEntry {
        symbol: "Zz".to_string(),
        quantity: 1.0,
    });
    assert!(!response.ok);
    assert!(response.message.starts_with("add_entry failed:"));
    assert!(session.accumulator().is_empty());

    let response = session.dispatch(Command::RemoveEntry { index: 0 });
    assert!(!response.ok);
}

#[test]
fn clear_resets_entries_and_name() {
    let mut session = Session::open_in_memory().unwrap();
    add(&mut session, "C", 1.0);
    session.dispatch(Command::SetName {
        name: "Графит".to_string(),
    });
    assert_eq!(session.accumulator().name(), Some("Графит"));

    let response = session.dispatch(Command::ClearEntries);
    assert!(response.ok);
    assert!(session.accumulator().is_empty());
    assert_eq!(session.accumulator().name(), None);
}

#[test]
fn save_uses_accumulator_name_when_none_given() {
    let mut session = Session::open_in_memory().unwrap();
    add(&mut session, "C", 1.0);
    add(&mut session, "H", 4.0);

    let response = session.dispatch(Command::SaveCompound { name: None });
    assert!(!response.ok, "saving without any name must fail");

    session.dispatch(Command::SetName {
        name: "Метан".to_string(),
    });
    let response = session.dispatch(Command::SaveCompound { name: None });
    assert!(response.ok, "{}", response.message);
    let Payload::SavedId(id) = response.payload else {
        panic!("expected saved id");
    };

    let response = session.dispatch(Command::ListSavedCompounds);
    let Payload::SavedCompounds(saved) = response.payload else {
        panic!("expected saved compounds");
    };
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, id);
    assert_eq!(saved[0].name, "Метан");
    assert_eq!(saved[0].composition, "C:1.0;H:4.0");

    session.dispatch(Command::ClearEntries);
    let response = session.dispatch(Command::LoadSavedCompound { id });
    assert!(response.ok);
    assert_eq!(session.accumulator().len(), 2);
    assert_eq!(session.accumulator().name(), Some("Метан"));

    let response = session.dispatch(Command::DeleteSavedCompound { id });
    assert!(response.ok);
    let response = session.dispatch(Command::DeleteSavedCompound { id });
    assert!(!response.ok);
}

#[test]
fn element_commands_roundtrip() {
    let mut session = Session::open_in_memory().unwrap();
    let tin = Element::new("Sn", "Олово", 118.71, 50);

    assert!(session.dispatch(Command::AddElement { element: tin.clone() }).ok);
    let duplicate = session.dispatch(Command::AddElement { element: tin });
    assert!(!duplicate.ok);
    assert!(duplicate.message.contains("already exists"));

    let response = session.dispatch(Command::LookupElement {
        symbol: "Sn".to_string(),
    });
    assert!(matches!(response.payload, Payload::Element(ref e) if e.name == "Олово"));

    let response = session.dispatch(Command::SearchElements {
        query: "Оло".to_string(),
    });
    assert!(matches!(response.payload, Payload::Elements(ref found) if found.len() == 1));

    let response = session.dispatch(Command::UpdateElement {
        old_symbol: "Sn".to_string(),
        element: Element::new("Sn", "Олово", 118.71, 50).with_category("Металл"),
    });
    assert!(response.ok);

    assert!(session
        .dispatch(Command::DeleteElement {
            symbol: "Sn".to_string()
        })
        .ok);
    let response = session.dispatch(Command::LookupElement {
        symbol: "Sn".to_string(),
    });
    assert!(!response.ok);
}

#[test]
fn import_reports_sentinel_counts() {
    let mut session = Session::open_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let exported = dir.path().join("all.csv");

    let response = session.dispatch(Command::ExportCsv {
        path: exported.clone(),
    });
    assert_eq!(response.payload, Payload::Count(27));

    let response = session.dispatch(Command::ImportCsv { path: exported });
    assert!(response.ok);
    assert_eq!(response.payload, Payload::Count(0));
    assert_eq!(response.message, "No new elements to import.");

    let fresh = dir.path().join("fresh.csv");
    fs::write(&fresh, "h\nSn,Олово,118.71\n").unwrap();
    let response = session.dispatch(Command::ImportCsv { path: fresh });
    assert_eq!(response.payload, Payload::Count(1));

    let response = session.dispatch(Command::ImportCsv {
        path: dir.path().join("nope.csv"),
    });
    assert!(!response.ok);
    assert_eq!(response.payload, Payload::Count(IMPORT_FAILED));
}

#[test]
fn export_report_writes_text_file() {
    let mut session = Session::open_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.txt");

    let response = session.dispatch(Command::ExportReport { path: path.clone() });
    assert!(!response.ok, "empty accumulator has nothing to report");

    add(&mut session, "Na", 1.0);
    add(&mut session, "Cl", 1.0);
    let response = session.dispatch(Command::ExportReport { path: path.clone() });
    assert!(response.ok, "{}", response.message);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("РЕЗУЛЬТАТЫ РАСЧЕТА МОЛЯРНОЙ МАССЫ\n"));
    assert!(text.contains("Соединение: Неизвестное соединение\n"));
    assert!(text.contains("Формула: Na + Cl\n"));
    assert!(text.contains("Молярная масса: 58.4400 г/моль\n"));
    assert!(text.contains("Натрий"));
}

#[test]
fn reference_compounds_are_listed() {
    let mut session = Session::open_in_memory().unwrap();
    let response = session.dispatch(Command::ListReferenceCompounds);
    assert!(matches!(response.payload, Payload::ReferenceCompounds(ref items) if items.len() == 6));
}

#[test]
fn commands_and_responses_serialize_as_tagged_json() {
    let command = Command::AddEntry {
        symbol: "H".to_string(),
        quantity: 2.0,
    };
    let json = serde_json::to_value(&command).unwrap();
    assert_eq!(json["command"], "add_entry");
    assert_eq!(json["quantity"], 2.0);

    let parsed: Command = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, command);

    let mut session = Session::open_in_memory().unwrap();
    let response = session.dispatch(Command::ListReferenceCompounds);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["payload"]["kind"], "reference_compounds");
    assert_eq!(json["payload"]["data"][0]["formula"], "H2O");
}

#[test]
fn filter_elements_matches_whole_category_only() {
    let mut session = Session::open_in_memory().unwrap();

    let response = session.dispatch(Command::FilterElements {
        category: "Инертный газ".to_string(),
    });
    assert!(response.ok);
    let Payload::Elements(found) = response.payload else {
        panic!("expected elements payload");
    };
    let symbols: Vec<&str> = found.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(symbols, ["He", "Ne", "Ar"]);

    let response = session.dispatch(Command::FilterElements {
        category: "Переходный".to_string(),
    });
    assert!(response.ok);
    assert_eq!(response.message, "No results.");
    assert_eq!(response.payload, Payload::Elements(Vec::new()));
}

#[test]
fn use_reference_compound_sets_name_and_keeps_entries() {
    let mut session = Session::open_in_memory().unwrap();
    add(&mut session, "Na", 1.0);

    let response = session.dispatch(Command::UseReferenceCompound { index: 1 });
    assert!(response.ok, "{}", response.message);
    assert_eq!(
        response.message,
        "Compound Поваренная соль loaded. Formula: NaCl"
    );
    assert_eq!(session.accumulator().name(), Some("Поваренная соль"));
    assert_eq!(session.accumulator().len(), 1);

    let response = session.dispatch(Command::UseReferenceCompound { index: 6 });
    assert!(!response.ok);
    assert!(response.message.starts_with("use_reference_compound failed:"));
    assert_eq!(session.accumulator().name(), Some("Поваренная соль"));
}
