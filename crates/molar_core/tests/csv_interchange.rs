use molar_core::db::open_db_in_memory;
use molar_core::interchange::csv::CSV_HEADER;
use molar_core::{Element, ElementRepository, ElementService, RepoError, SqliteElementRepository};
use rusqlite::Connection;
use std::fs;

fn empty_store() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DELETE FROM elements;").unwrap();
    conn
}

#[test]
fn export_writes_localized_header_and_rows() {
    let conn = open_db_in_memory().unwrap();
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elements.csv");

    let rows = service.export_csv(&path).unwrap();
    assert_eq!(rows, 27);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], CSV_HEADER.join(","));
    assert_eq!(lines[0], "Символ,Название,Атомная масса,Категория");
    assert_eq!(lines[1], "H,Водород,1.008,Неметалл");
    assert_eq!(lines[10], "Ne,Неон,20.18,Инертный газ");
    assert_eq!(lines.len(), 28);
}

#[test]
fn export_then_import_into_empty_store_resets_atomic_number() {
    let source = open_db_in_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.csv");
    let exported = ElementService::new(SqliteElementRepository::new(&source))
        .list_all()
        .unwrap();
    ElementService::new(SqliteElementRepository::new(&source))
        .export_csv(&path)
        .unwrap();

    let target = empty_store();
    let service = ElementService::new(SqliteElementRepository::new(&target));
    assert_eq!(service.import_csv(&path).unwrap(), exported.len());

    for original in &exported {
        let imported = service.lookup(&original.symbol).unwrap().unwrap();
        assert_eq!(imported.name, original.name);
        assert_eq!(imported.atomic_mass, original.atomic_mass);
        assert_eq!(imported.category, original.category);
        assert_eq!(imported.atomic_number, 0);
        assert_eq!(imported.discovered_year, None);
    }
}

#[test]
fn import_skips_existing_symbols_and_short_rows() {
    let conn = open_db_in_memory().unwrap();
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("import.csv");
    fs::write(
        &path,
        "Символ,Название,Атомная масса,Категория\n\
         H,Другой водород,2.0,Неметалл\n\
         Sn,Олово,118.71\n\
         Ti,Титан\n\
         W,Вольфрам, 183.84 ,Переходный металл\n\
         Sn,Олово снова,1.0,\n",
    )
    .unwrap();

    assert_eq!(service.import_csv(&path).unwrap(), 2);

    assert_eq!(service.lookup("H").unwrap().unwrap().name, "Водород");
    assert!(service.lookup("Ti").unwrap().is_none());

    let tin = service.lookup("Sn").unwrap().unwrap();
    assert_eq!(tin, Element::new("Sn", "Олово", 118.71, 0));

    let tungsten = service.lookup("W").unwrap().unwrap();
    assert_eq!(tungsten.atomic_mass, 183.84);
    assert_eq!(tungsten.category.as_deref(), Some("Переходный металл"));
}

#[test]
fn import_with_nothing_new_returns_zero() {
    let conn = open_db_in_memory().unwrap();
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("same.csv");

    service.export_csv(&path).unwrap();
    assert_eq!(service.import_csv(&path).unwrap(), 0);
}

#[test]
fn unparseable_mass_aborts_but_keeps_earlier_rows() {
    let conn = empty_store();
    let repo = SqliteElementRepository::new(&conn);
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    fs::write(
        &path,
        "Символ,Название,Атомная масса,Категория\n\
         H,Водород,1.008,Неметалл\n\
         He,Гелий,четыре,Инертный газ\n\
         Li,Литий,6.94,Щелочной металл\n",
    )
    .unwrap();

    let err = service.import_csv(&path).unwrap_err();
    assert!(matches!(err, RepoError::Parse { line: 3, .. }), "{err}");

    assert!(repo.get_element("H").unwrap().is_some());
    assert!(repo.get_element("He").unwrap().is_none());
    assert!(repo.get_element("Li").unwrap().is_none());
}

#[test]
fn invalid_row_aborts_import() {
    let conn = empty_store();
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invalid.csv");
    fs::write(&path, "header\nLongSym,Name,1.0\n").unwrap();

    let err = service.import_csv(&path).unwrap_err();
    assert!(matches!(err, RepoError::Parse { line: 2, .. }));
}

#[test]
fn missing_file_is_io_error() {
    let conn = open_db_in_memory().unwrap();
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();

    let err = service.import_csv(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, RepoError::Io(_)));
}

#[test]
fn empty_file_is_parse_error() {
    let conn = open_db_in_memory().unwrap();
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").unwrap();

    let err = service.import_csv(&path).unwrap_err();
    assert!(matches!(err, RepoError::Parse { line: 1, .. }));
}

#[test]
fn export_to_unwritable_path_is_io_error() {
    let conn = open_db_in_memory().unwrap();
    let service = ElementService::new(SqliteElementRepository::new(&conn));
    let dir = tempfile::tempdir().unwrap();

    let err = service
        .export_csv(dir.path().join("missing-dir").join("out.csv"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Io(_)));
}
