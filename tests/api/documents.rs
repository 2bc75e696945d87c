use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::helpers::spawn_app;

fn timestamp(document: &Value) -> DateTime<Utc> {
    document["updatedAt"]
        .as_str()
        .expect("updatedAt present")
        .parse()
        .expect("updatedAt is RFC 3339")
}

#[tokio::test]
async fn create_returns_an_empty_default_document() {
    let app = spawn_app().await;

    let created = app.create_document().await;

    assert!(!created["id"].as_str().unwrap().is_empty());
    assert_eq!(created["title"], "Untitled Document");
    assert_eq!(created["content"], json!({}));
    timestamp(&created);
}

#[tokio::test]
async fn created_document_can_be_fetched() {
    let app = spawn_app().await;
    let created = app.create_document().await;
    let id = created["id"].as_str().unwrap();

    let response = app.get_document(id).await;
    assert_eq!(response.status().as_u16(), 200);

    let fetched: Value = response.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn rapid_creates_never_share_an_id() {
    let app = spawn_app().await;

    let mut ids = HashSet::new();
    for _ in 0..20 {
        let created = app.create_document().await;
        ids.insert(created["id"].as_str().unwrap().to_string());
    }

    assert_eq!(ids.len(), 20);
}

#[tokio::test]
async fn update_then_get_returns_what_was_written() {
    let app = spawn_app().await;
    let created = app.create_document().await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .put_document(id, &json!({"title": "Report", "content": {"html": "<p>hi</p>"}}))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let fetched: Value = app.get_document(id).await.json().await.unwrap();
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["title"], "Report");
    assert_eq!(fetched["content"], json!({"html": "<p>hi</p>"}));
    assert!(timestamp(&fetched) > timestamp(&created));
}

#[tokio::test]
async fn update_resets_fields_that_were_left_out() {
    let app = spawn_app().await;
    let created = app.create_document().await;
    let id = created["id"].as_str().unwrap();
    app.put_document(id, &json!({"title": "Report", "content": {"html": "<p>hi</p>"}}))
        .await;

    let updated: Value = app
        .put_document(id, &json!({"title": "Renamed"}))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["content"], json!({}));

    let updated: Value = app
        .put_document(id, &json!({"title": "", "content": {"html": "<p>x</p>"}}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["title"], "Untitled Document");
}

#[tokio::test]
async fn unknown_document_is_404() {
    let app = spawn_app().await;

    let response = app.get_document("nonexistent").await;
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Document not found"}));

    let response = app.put_document("nonexistent", &json!({"title": "x"})).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn update_does_not_create_missing_records() {
    let app = spawn_app().await;

    app.put_document("1718000000000", &json!({"title": "x"})).await;

    let listed: Vec<Value> = app.list_documents().await.json().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn list_isolates_a_corrupted_record() {
    let app = spawn_app().await;
    let created = app.create_document().await;
    app.write_raw_record("1600000000000", "{\"id\": \"1600000000000\", \"title\":");

    let response = app.list_documents().await;
    assert_eq!(response.status().as_u16(), 200);

    let listed: Vec<Value> = response.json().await.unwrap();
    assert_eq!(listed.len(), 2);

    let good = listed.iter().find(|d| d["id"] == created["id"]).unwrap();
    assert_eq!(good["title"], "Untitled Document");
    assert_eq!(good["updatedAt"], created["updatedAt"]);

    let broken = listed.iter().find(|d| d["id"] == "1600000000000").unwrap();
    assert_eq!(broken["title"], "Corrupted File");

    let response = app.get_document("1600000000000").await;
    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn records_are_stored_one_file_per_document() {
    let app = spawn_app().await;
    let created = app.create_document().await;
    let id = created["id"].as_str().unwrap();

    let on_disk = std::fs::read_to_string(app.data_dir.join(format!("{id}.json"))).unwrap();
    let on_disk: Value = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(on_disk, created);

    let files = std::fs::read_dir(&app.data_dir).unwrap().count();
    assert_eq!(files, 1);
}

#[tokio::test]
async fn records_in_another_shape_are_listed_and_served() {
    let app = spawn_app().await;
    app.write_raw_record("111", r#"{"title": "Notes", "content": "<p>x</p>"}"#);
    app.write_raw_record("222", r#"{"title": null}"#);

    let listed: Vec<Value> = app.list_documents().await.json().await.unwrap();
    assert_eq!(listed.len(), 2);
    let notes = listed.iter().find(|d| d["id"] == "111").unwrap();
    assert_eq!(notes["title"], "Notes");
    assert!(notes.get("updatedAt").is_none());
    let untitled = listed.iter().find(|d| d["id"] == "222").unwrap();
    assert_eq!(untitled["title"], "Untitled Document");

    let response = app.get_document("111").await;
    assert_eq!(response.status().as_u16(), 200);
    let fetched: Value = response.json().await.unwrap();
    assert_eq!(
        fetched,
        json!({"id": "111", "title": "Notes", "content": "<p>x</p>"})
    );
}

#[tokio::test]
async fn files_that_are_not_valid_ids_are_not_listed() {
    let app = spawn_app().await;
    app.write_raw_record("my.notes", "{}");

    let listed: Vec<Value> = app.list_documents().await.json().await.unwrap();
    assert!(listed.is_empty());
}
