use beartrak_core::model::record::{NAME_MAX_CHARS, URL_MAX_CHARS};
use beartrak_core::{NewRecord, RecordPatch, RecordValidationError};

#[test]
fn new_record_requires_non_empty_name() {
    let err = NewRecord::new("").validate().unwrap_err();
    assert_eq!(err, RecordValidationError::EmptyName);
    assert_eq!(err.field(), "name");
}

#[test]
fn name_limit_counts_characters_not_bytes() {
    let at_limit = "é".repeat(NAME_MAX_CHARS);
    NewRecord::new(at_limit).validate().unwrap();

    let over_limit = "a".repeat(NAME_MAX_CHARS + 1);
    let err = NewRecord::new(over_limit).validate().unwrap_err();
    assert_eq!(
        err,
        RecordValidationError::NameTooLong {
            chars: NAME_MAX_CHARS + 1
        }
    );
}

#[test]
fn url_limit_is_enforced_on_create_and_patch() {
    let long_url = format!("https://{}", "x".repeat(URL_MAX_CHARS));

    let create_err = NewRecord::new("ok").with_url(long_url.clone()).validate().unwrap_err();
    assert_eq!(create_err.field(), "url");

    let patch = RecordPatch {
        url: Some(Some(long_url)),
        ..RecordPatch::default()
    };
    assert_eq!(patch.validate().unwrap_err().field(), "url");
}

#[test]
fn patch_without_fields_is_empty_and_valid() {
    let patch = RecordPatch::default();
    assert!(patch.is_empty());
    patch.validate().unwrap();

    let rename = RecordPatch::rename("next");
    assert!(!rename.is_empty());
}

#[test]
fn patch_rejects_empty_name_but_allows_clearing_url() {
    let empty_name = RecordPatch::rename("");
    assert_eq!(
        empty_name.validate().unwrap_err(),
        RecordValidationError::EmptyName
    );

    let clear_url = RecordPatch {
        url: Some(None),
        ..RecordPatch::default()
    };
    clear_url.validate().unwrap();
}
