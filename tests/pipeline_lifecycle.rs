//! Pipeline Lifecycle Tests
//!
//! Records driven through `ValidationPipeline`:
//! - Default and exclusive flags together keep exactly one holder
//! - A claim the store refuses leaves the previous holder in place
//! - A new record validated twice before its first save
//! - Writer lock keeps the flag exclusive under concurrent saves
//! - Attachment promotion on save, and its failure modes
//! - Destroy guards
//! - Definitions loaded from disk

use std::fs;
use std::sync::Arc;
use std::thread;

use morse::registry::RegistryErrorCode;
use morse::validation::BASE;
use morse::{
    Accessor, AttachmentConfig, FieldKind, InMemoryRecordStore, PipelineConfig, PipelineError,
    Record, RecordId, RecordStore, RecordType, Registry, RegistryLoader, Rule, Upload,
    ValidationPipeline, Value,
};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn owner() -> RecordType {
    RecordType::new("owner").field("name", FieldKind::Text)
}

fn asset() -> RecordType {
    RecordType::new("asset").field("attachment", FieldKind::Upload)
}

fn land() -> RecordType {
    RecordType::new("land")
        .field("name", FieldKind::Text)
        .field("default_land", FieldKind::Bool)
        .field("owner_id", FieldKind::Reference)
        .field("attachment", FieldKind::Upload)
        .field("asset_id", FieldKind::Reference)
        .field("plots", FieldKind::Int)
        .field("guarded", FieldKind::Bool)
        .rule(Rule::blank_to_nil("name"))
        .rule(Rule::there_must_be_one("default_land"))
        .rule(Rule::integer_or_default("plots", 1))
        .rule(Rule::optional_association("owner_id", "owner"))
        .rule(Rule::there_can_be_only_one("default_land"))
        .rule(Rule::process_attachment(AttachmentConfig::default()))
        .rule(Rule::survive_if("guarded"))
}

fn registry_with(types: Vec<RecordType>) -> Registry {
    let mut registry = Registry::new();
    for record_type in types {
        registry.register(record_type).unwrap();
    }
    registry
}

fn setup() -> (ValidationPipeline, Arc<InMemoryRecordStore>) {
    setup_with(registry_with(vec![owner(), asset(), land()]))
}

fn setup_with(registry: Registry) -> (ValidationPipeline, Arc<InMemoryRecordStore>) {
    let store = Arc::new(InMemoryRecordStore::new());
    let pipeline = ValidationPipeline::new(registry, store.clone(), PipelineConfig::quiet()).unwrap();
    (pipeline, store)
}

fn holders(store: &InMemoryRecordStore) -> Vec<Record> {
    store.find_where("land", "default_land", &Value::Bool(true)).unwrap()
}

fn upload() -> Upload {
    Upload::new(b"%PDF-1.7".to_vec(), "application/pdf")
}

// =============================================================================
// Default + Exclusive Flag
// =============================================================================

/// First record: the default guarantee claims the flag, the exclusivity
/// check finds no rivals, the save succeeds with the flag set.
#[test]
fn test_first_record_becomes_default() {
    let (pipeline, store) = setup();

    let mut first = pipeline.new_record("land").unwrap().with("name", "Avalon");
    assert!(pipeline.save(&mut first).unwrap());

    assert!(first.errors().is_empty());
    assert!(first.get("default_land").is_true());
    assert_eq!(holders(&store).len(), 1);

    let metrics = pipeline.metrics();
    assert_eq!(metrics.defaults_assigned, 1);
    assert_eq!(metrics.rivals_demoted, 0);
    assert_eq!(metrics.record_types_loaded, 3);
}

/// Later records leave the flag alone until one claims it explicitly.
#[test]
fn test_flag_moves_when_claimed() {
    let (pipeline, store) = setup();

    let mut first = pipeline.new_record("land").unwrap();
    pipeline.save(&mut first).unwrap();

    let mut second = pipeline.new_record("land").unwrap();
    pipeline.save(&mut second).unwrap();
    assert!(second.get("default_land").is_null());

    // Saving a record that does not claim the flag leaves the holder alone.
    let untouched = holders(&store);
    assert_eq!(untouched.len(), 1);
    assert_eq!(untouched[0].id(), first.id());
    assert_eq!(pipeline.metrics().rivals_demoted, 0);

    second.set("default_land", Value::Bool(true));
    assert!(pipeline.save(&mut second).unwrap());

    let remaining = holders(&store);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), second.id());
    assert_eq!(
        store.reload(&first).unwrap().get("default_land"),
        &Value::Bool(false)
    );
}

/// An explicit `false` on a later record is not a claim either.
#[test]
fn test_unflagged_records_never_strip_the_holder() {
    let (pipeline, store) = setup();

    let mut first = pipeline.new_record("land").unwrap();
    pipeline.save(&mut first).unwrap();

    for name in ["Lyonesse", "Camelot", "Tintagel"] {
        let mut other = pipeline
            .new_record("land")
            .unwrap()
            .with("name", name)
            .with("default_land", false);
        assert!(pipeline.save(&mut other).unwrap());
        pipeline.save(&mut other).unwrap();
    }

    let remaining = holders(&store);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), first.id());
    assert_eq!(store.count("land").unwrap(), 4);
}

/// A claim that the store refuses hands the flag back to the old holder.
#[test]
fn test_refused_claim_restores_previous_holder() {
    let featured = land().field("featured", FieldKind::Bool);
    let store = Arc::new(InMemoryRecordStore::new().with_exclusive_flag("land", "featured"));
    let pipeline = ValidationPipeline::new(
        registry_with(vec![owner(), asset(), featured]),
        store.clone(),
        PipelineConfig::quiet(),
    )
    .unwrap();

    let mut first = pipeline.new_record("land").unwrap().with("featured", true);
    assert!(pipeline.save(&mut first).unwrap());

    let mut second = pipeline
        .new_record("land")
        .unwrap()
        .with("default_land", true)
        .with("featured", true);
    assert!(matches!(
        pipeline.save(&mut second),
        Err(PipelineError::Store(_))
    ));
    assert!(second.is_new());

    let remaining = holders(&store);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), first.id());
    assert_eq!(pipeline.metrics().effects_rolled_back, 1);
}

/// Re-saving the current holder does not demote it.
#[test]
fn test_holder_resave_keeps_flag() {
    let (pipeline, store) = setup();

    let mut first = pipeline.new_record("land").unwrap();
    pipeline.save(&mut first).unwrap();
    pipeline.save(&mut first).unwrap();

    assert!(store.reload(&first).unwrap().get("default_land").is_true());
    assert_eq!(pipeline.metrics().rivals_demoted, 0);
}

/// A new record has no id yet, so nothing is excluded from its rival query.
/// Validating it twice changes nothing on its own; the save demotes.
#[test]
fn test_new_record_validated_twice_before_first_save() {
    let (pipeline, store) = setup();

    let mut holder = pipeline.new_record("land").unwrap();
    pipeline.save(&mut holder).unwrap();

    let mut candidate = pipeline.new_record("land").unwrap().with("default_land", true);
    assert!(pipeline.validate(&mut candidate).unwrap());
    assert!(pipeline.validate(&mut candidate).unwrap());

    assert!(candidate.is_new());
    assert!(candidate.get("default_land").is_true());
    assert_eq!(holders(&store)[0].id(), holder.id());

    assert!(pipeline.save(&mut candidate).unwrap());
    let remaining = holders(&store);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), candidate.id());
}

/// With nobody holding the flag, repeated validation keeps claiming it.
#[test]
fn test_new_record_validated_twice_with_no_holder() {
    let (pipeline, store) = setup();

    let mut candidate = pipeline.new_record("land").unwrap();
    pipeline.validate(&mut candidate).unwrap();
    pipeline.validate(&mut candidate).unwrap();

    assert!(candidate.get("default_land").is_true());
    assert_eq!(store.count("land").unwrap(), 0);
    assert_eq!(pipeline.metrics().defaults_assigned, 2);
}

/// Concurrent saves of flagged records still leave one holder.
#[test]
fn test_writer_lock_keeps_flag_exclusive() {
    let (pipeline, store) = setup();
    let pipeline = Arc::new(pipeline);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || {
                let mut record = pipeline
                    .new_record("land")
                    .unwrap()
                    .with("name", format!("land-{}", i))
                    .with("default_land", true);
                pipeline.save(&mut record).unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(store.count("land").unwrap(), 8);
    assert_eq!(holders(&store).len(), 1);
    assert_eq!(pipeline.metrics().rivals_demoted, 7);
}

/// A storage-level constraint backs the cooperative rules.
#[test]
fn test_store_constraint_rejects_second_holder() {
    let store = Arc::new(InMemoryRecordStore::new().with_exclusive_flag("land", "default_land"));
    let flags_only = RecordType::new("land").field("default_land", FieldKind::Bool);
    let pipeline = ValidationPipeline::new(
        registry_with(vec![flags_only]),
        store.clone(),
        PipelineConfig::quiet(),
    )
    .unwrap();

    let mut first = pipeline.new_record("land").unwrap().with("default_land", true);
    pipeline.save(&mut first).unwrap();

    let mut second = pipeline.new_record("land").unwrap().with("default_land", true);
    let err = pipeline.save(&mut second).unwrap_err();
    assert!(matches!(err, PipelineError::Store(_)));
    assert!(second.is_new());
}

// =============================================================================
// Normalization and References on Save
// =============================================================================

#[test]
fn test_before_validation_rules_run_on_save() {
    let (pipeline, store) = setup();

    let mut record = pipeline.new_record("land").unwrap().with("name", "   ");
    pipeline.save(&mut record).unwrap();

    let stored = store.reload(&record).unwrap();
    assert!(stored.get("name").is_null());
    assert_eq!(stored.get("plots"), &Value::Int(1));
}

#[test]
fn test_dangling_optional_owner_is_cleared_on_save() {
    let (pipeline, store) = setup();

    let mut record = pipeline
        .new_record("land")
        .unwrap()
        .with("owner_id", RecordId::generate());
    assert!(pipeline.save(&mut record).unwrap());

    assert!(store.reload(&record).unwrap().get("owner_id").is_null());
    assert_eq!(pipeline.metrics().references_cleared, 1);
}

#[test]
fn test_missing_required_owner_blocks_save() {
    let deed = RecordType::new("deed")
        .field("owner_id", FieldKind::Reference)
        .rule(Rule::associated_exists("owner_id", "owner"));
    let (pipeline, store) = setup_with(registry_with(vec![owner(), deed]));

    let mut record = pipeline.new_record("deed").unwrap();
    assert!(!pipeline.save(&mut record).unwrap());
    assert_eq!(record.errors().full_messages(), vec!["Owner does not exist".to_string()]);
    assert_eq!(store.count("deed").unwrap(), 0);

    let mut arthur = pipeline.new_record("owner").unwrap().with("name", "Arthur");
    pipeline.save(&mut arthur).unwrap();

    record.set("owner_id", Value::Ref(arthur.id().unwrap()));
    assert!(pipeline.save(&mut record).unwrap());
    assert!(record.errors().is_empty());
}

// =============================================================================
// Attachments
// =============================================================================

#[test]
fn test_attachment_promoted_on_save() {
    let (pipeline, store) = setup();

    let mut record = pipeline.new_record("land").unwrap().with("attachment", upload());
    assert!(pipeline.save(&mut record).unwrap());

    assert!(record.errors().is_empty());
    assert!(record.get("attachment").is_null());
    let asset_id = record.get("asset_id").as_record_id().unwrap();

    let stored = store.reload(&record).unwrap();
    assert_eq!(stored.get("asset_id"), &Value::Ref(asset_id));
    assert!(stored.get("attachment").is_null());

    let asset = store.find_by_id("asset", asset_id).unwrap().unwrap();
    assert_eq!(asset.get("attachment").as_upload(), Some(&upload()));

    let metrics = pipeline.metrics();
    assert_eq!(metrics.attachments_promoted, 1);
    // Parent, child, parent again.
    assert_eq!(metrics.saves, 3);
}

/// The parent is saved; the upload stays on it with an error.
#[test]
fn test_attachment_store_failure() {
    let (pipeline, store) = setup();
    store.reject_saves_of("asset").unwrap();

    let mut record = pipeline.new_record("land").unwrap().with("attachment", upload());
    assert!(pipeline.save(&mut record).unwrap());

    assert!(!record.is_new());
    assert_eq!(record.get("attachment").as_upload(), Some(&upload()));
    assert!(record.get("asset_id").is_null());
    assert_eq!(record.errors().messages_for("attachment"), ["had a problem saving"]);
    assert_eq!(store.count("asset").unwrap(), 0);
    assert_eq!(pipeline.metrics().attachments_failed, 1);

    // Resubmitting once the store accepts assets completes the promotion.
    store.accept_saves_of("asset").unwrap();
    assert!(pipeline.save(&mut record).unwrap());
    assert!(record.errors().is_empty());
    assert!(record.get("asset_id").as_record_id().is_some());
}

/// A child rejected by its own validation counts as a failed save.
#[test]
fn test_attachment_child_invalid() {
    let strict_asset = asset()
        .field("approved", FieldKind::Bool)
        .rule(Rule::mandatory_boolean("approved"));
    let (pipeline, store) = setup_with(registry_with(vec![owner(), strict_asset, land()]));

    let mut record = pipeline.new_record("land").unwrap().with("attachment", upload());
    assert!(pipeline.save(&mut record).unwrap());

    assert_eq!(record.errors().messages_for("attachment"), ["had a problem saving"]);
    assert!(record.get("attachment").as_upload().is_some());
    assert_eq!(store.count("asset").unwrap(), 0);
}

// =============================================================================
// Destroy
// =============================================================================

#[test]
fn test_guard_blocks_destroy() {
    let (pipeline, store) = setup();

    let mut record = pipeline.new_record("land").unwrap().with("guarded", true);
    pipeline.save(&mut record).unwrap();

    assert!(!pipeline.destroy(&mut record).unwrap());
    assert_eq!(
        record.errors().messages_for(BASE),
        ["Cannot destroy while guarded is true"]
    );
    assert_eq!(store.count("land").unwrap(), 1);
    assert_eq!(pipeline.metrics().destroys_blocked, 1);

    record.set("guarded", Value::Bool(false));
    assert!(pipeline.destroy(&mut record).unwrap());
    assert!(record.errors().is_empty());
    assert_eq!(store.count("land").unwrap(), 0);
    assert_eq!(pipeline.metrics().destroys, 1);
}

// =============================================================================
// Definitions on Disk
// =============================================================================

#[test]
fn test_pipeline_from_saved_definitions() {
    let tmp = TempDir::new().unwrap();
    let loader = RegistryLoader::new(tmp.path());
    for record_type in [owner(), asset(), land()] {
        loader.save(&record_type).unwrap();
    }

    let mut registry = Registry::new();
    assert_eq!(loader.load_into(&mut registry).unwrap(), 3);
    assert_eq!(registry.get("land"), Some(&land()));

    let (pipeline, _) = setup_with(registry);
    let mut record = pipeline.new_record("land").unwrap();
    assert!(pipeline.save(&mut record).unwrap());
    assert!(record.get("default_land").is_true());
}

#[test]
fn test_hand_written_definition() {
    let tmp = TempDir::new().unwrap();
    let loader = RegistryLoader::new(tmp.path());
    fs::create_dir_all(loader.definition_dir()).unwrap();
    fs::write(
        loader.definition_dir().join("signup.json"),
        r#"{
            "name": "signup",
            "fields": { "email": "text", "terms": "bool" },
            "rules": [
                { "rule": "blank_to_nil", "field": "email" },
                { "rule": "mandatory_boolean", "field": "terms", "message": "must be accepted" }
            ]
        }"#,
    )
    .unwrap();

    let mut registry = Registry::new();
    loader.load_into(&mut registry).unwrap();
    let (pipeline, _) = setup_with(registry);

    let mut signup = pipeline.new_record("signup").unwrap().with("email", "");
    assert!(!pipeline.save(&mut signup).unwrap());
    assert!(signup.get("email").is_null());
    assert_eq!(signup.errors().full_messages(), vec!["Terms must be accepted".to_string()]);
}

#[test]
fn test_definition_with_unknown_target_is_refused() {
    let registry = registry_with(vec![land()]);
    let store = Arc::new(InMemoryRecordStore::new());

    match ValidationPipeline::new(registry, store, PipelineConfig::quiet()) {
        Err(PipelineError::Registry(err)) => {
            assert_eq!(err.code(), RegistryErrorCode::MorseUnknownRecordType)
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("pipeline accepted a dangling target"),
    }
}
