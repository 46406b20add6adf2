use chrono::NaiveDate;
use garden_core::{
    open_store_in_memory, DocumentGardenRepository, DocumentStore, Garden, GardenPatch,
    GardenRepository, GardenValidationError, Plant, RepoError, SqliteDocumentStore, Supply,
    GARDENS_COLLECTION,
};
use serde_json::json;
use std::collections::BTreeMap;

fn maple_st() -> Garden {
    Garden::new(
        "Maple St",
        "12 Maple St",
        0.5,
        NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
        vec!["Alice".to_string(), "Bob".to_string()],
    )
}

#[test]
fn create_then_get_returns_exact_fields_and_empty_collections() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));

    repo.create_or_replace_garden(&maple_st()).unwrap();

    let loaded = repo.get_garden("Maple St").unwrap().unwrap();
    assert_eq!(loaded, maple_st());
    assert!(loaded.plants.is_empty());
    assert!(loaded.tasks.is_empty());
    assert!(loaded.supplies.is_empty());
}

#[test]
fn create_twice_keeps_only_second_write() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));

    let mut first = maple_st();
    first
        .supplies
        .insert("s1".to_string(), Supply::new("Hose", 1));
    repo.create_or_replace_garden(&first).unwrap();

    let mut second = maple_st();
    second.location = "99 Elm Ave".to_string();
    repo.create_or_replace_garden(&second).unwrap();

    let loaded = repo.get_garden("Maple St").unwrap().unwrap();
    assert_eq!(loaded.location, "99 Elm Ave");
    assert!(loaded.supplies.is_empty(), "overwrite must not merge");
    assert_eq!(repo.list_gardens().unwrap(), vec!["Maple St".to_string()]);
}

#[test]
fn partial_update_changes_only_named_field() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));

    let mut garden = maple_st();
    garden
        .supplies
        .insert("s1".to_string(), Supply::new("Hose", 2));
    repo.create_or_replace_garden(&garden).unwrap();

    repo.update_garden_fields("Maple St", &GardenPatch::location("X"))
        .unwrap();

    let loaded = repo.get_garden("Maple St").unwrap().unwrap();
    assert_eq!(loaded.location, "X");
    garden.location = "X".to_string();
    assert_eq!(loaded, garden);
}

#[test]
fn get_unknown_garden_is_absent_not_error() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));

    assert!(repo.get_garden("nonexistent").unwrap().is_none());
}

#[test]
fn update_unknown_garden_fails_and_creates_nothing() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));

    let err = repo
        .update_garden_fields("ghost", &GardenPatch::location("X"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(ref name) if name == "ghost"));
    assert!(repo.list_gardens().unwrap().is_empty());
}

#[test]
fn listing_reflects_writes() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));
    assert!(repo.list_gardens().unwrap().is_empty());

    repo.create_or_replace_garden(&maple_st()).unwrap();
    let mut other = maple_st();
    other.name = "Oak Lane".to_string();
    repo.create_or_replace_garden(&other).unwrap();

    let listed = repo.list_gardens().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&"Maple St".to_string()));
    assert!(listed.contains(&"Oak Lane".to_string()));
}

#[test]
fn supplies_update_scenario_keeps_location() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));
    repo.create_or_replace_garden(&maple_st()).unwrap();

    let mut supplies = BTreeMap::new();
    supplies.insert("s1".to_string(), Supply::new("Hose", 2));
    repo.update_garden_fields("Maple St", &GardenPatch::supplies(supplies.clone()))
        .unwrap();

    let loaded = repo.get_garden("Maple St").unwrap().unwrap();
    assert_eq!(loaded.supplies, supplies);
    assert_eq!(loaded.location, "12 Maple St");

    let raw = SqliteDocumentStore::new(&conn)
        .get(GARDENS_COLLECTION, "Maple St")
        .unwrap()
        .unwrap();
    assert_eq!(
        raw["supplies"],
        json!({"s1": {"name": "Hose", "quantity": 2, "notes": ""}})
    );
}

#[test]
fn invalid_records_never_reach_the_store() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));

    let mut garden = maple_st();
    garden.size = 0.0;
    let err = repo.create_or_replace_garden(&garden).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(GardenValidationError::InvalidSize(_))
    ));
    assert!(repo.list_gardens().unwrap().is_empty());

    repo.create_or_replace_garden(&maple_st()).unwrap();
    let err = repo
        .update_garden_fields("Maple St", &GardenPatch::default())
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(GardenValidationError::EmptyPatch)
    ));
}

#[test]
fn stored_document_that_is_not_a_garden_is_reported() {
    let conn = open_store_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let sparse = json!({"name": "Sparse"}).as_object().cloned().unwrap();
    store.set(GARDENS_COLLECTION, "Sparse", &sparse).unwrap();

    let repo = DocumentGardenRepository::new(store);
    let err = repo.get_garden("Sparse").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn stored_document_with_foreign_name_is_reported() {
    let conn = open_store_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let document = maple_st().to_document().unwrap();
    store.set(GARDENS_COLLECTION, "Elsewhere", &document).unwrap();

    let repo = DocumentGardenRepository::new(store);
    assert!(matches!(
        repo.get_garden("Elsewhere"),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn stored_sizes_read_back_bit_exact() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));

    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut mismatches = Vec::new();
    for i in 0..5_000 {
        let bits = next();
        let size = if i % 2 == 0 {
            (bits >> 11) as f64 / (1u64 << 53) as f64 * 1000.0 + 0.1
        } else {
            // Any positive, finite, normal double.
            let exponent = 1 + (bits >> 52) % 2046;
            f64::from_bits((exponent << 52) | (bits & ((1u64 << 52) - 1)))
        };

        let mut garden = maple_st();
        garden.size = size;
        repo.create_or_replace_garden(&garden).unwrap();
        let loaded = repo.get_garden("Maple St").unwrap().unwrap();
        if loaded.size.to_bits() != size.to_bits() {
            mismatches.push((size, loaded.size));
        }
    }
    assert!(mismatches.is_empty(), "size drift: {:?}", mismatches.first());
}

#[test]
fn free_text_planted_value_is_reported_as_invalid_data() {
    let conn = open_store_in_memory().unwrap();
    let store = SqliteDocumentStore::new(&conn);
    let mut document = maple_st().to_document().unwrap();
    document.insert(
        "plants".to_string(),
        json!({"p1": {"name": "Tomato", "org_type": "vegetable", "planted": "spring 2023"}}),
    );
    store.set(GARDENS_COLLECTION, "Maple St", &document).unwrap();

    let repo = DocumentGardenRepository::new(store);
    assert!(matches!(
        repo.get_garden("Maple St"),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn iso_planted_value_reads_back_as_date() {
    let conn = open_store_in_memory().unwrap();
    let repo = DocumentGardenRepository::new(SqliteDocumentStore::new(&conn));
    let mut garden = maple_st();
    let mut plant = Plant::new("Tomato", "vegetable");
    plant.planted = NaiveDate::from_ymd_opt(2023, 5, 1);
    garden.plants.insert("p1".to_string(), plant.clone());
    repo.create_or_replace_garden(&garden).unwrap();

    let loaded = repo.get_garden("Maple St").unwrap().unwrap();
    assert_eq!(loaded.plants["p1"], plant);
}
