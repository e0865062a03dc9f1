// Unit tests for the URL query-string composer
//
// These verify upsert/remove behavior and the "all" sentinel that clears
// a category filter.

use tutorium::query::{apply, remove_params, set_param, FilterChange, ALL_SENTINEL};

#[test]
fn test_set_param_appends_new_key() {
    let next = set_param("", "subject", "science");
    assert_eq!(next, "subject=science");
}

#[test]
fn test_set_param_upserts_existing_key_in_place() {
    let next = set_param("subject=science&topic=cells", "subject", "maths");
    assert_eq!(next, "subject=maths&topic=cells");
}

#[test]
fn test_set_param_preserves_other_keys() {
    let next = set_param("subject=science", "topic", "cells");
    assert_eq!(next, "subject=science&topic=cells");
}

#[test]
fn test_remove_params_removes_only_listed_keys() {
    let next = remove_params("subject=science&topic=cells", &["topic"]);
    assert_eq!(next, "subject=science");
}

#[test]
fn test_remove_params_missing_key_is_noop() {
    let next = remove_params("subject=science", &["topic"]);
    assert_eq!(next, "subject=science");
}

#[test]
fn test_apply_set_all_sentinel_removes_key() {
    let change = FilterChange::Set {
        key: "subject".to_string(),
        value: ALL_SENTINEL.to_string(),
    };

    let next = apply("subject=science&topic=cells", &change);
    assert_eq!(next, "topic=cells");
}

#[test]
fn test_apply_set_all_on_empty_params_is_net_noop() {
    let change = FilterChange::Set {
        key: "subject".to_string(),
        value: ALL_SENTINEL.to_string(),
    };

    let next = apply("", &change);
    assert_eq!(next, "");
}

#[test]
fn test_apply_set_and_remove() {
    let set = FilterChange::Set {
        key: "topic".to_string(),
        value: "algebra".to_string(),
    };
    let next = apply("subject=maths", &set);
    assert_eq!(next, "subject=maths&topic=algebra");

    let remove = FilterChange::Remove {
        keys: vec!["topic".to_string()],
    };
    let next = apply(&next, &remove);
    assert_eq!(next, "subject=maths");
}

#[test]
fn test_values_are_url_encoded() {
    let next = set_param("", "topic", "derivatives & integrals");
    assert_eq!(next, "topic=derivatives+%26+integrals");

    // And decoded back on the next pass
    let next = set_param(&next, "topic", "limits");
    assert_eq!(next, "topic=limits");
}
