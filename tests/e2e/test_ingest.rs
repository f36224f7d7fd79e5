use crate::e2e::helpers;

use helpers::{ids, item, TestContext, TEST_SECRET};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_ingest_batch_file_and_report_added_count(ctx: &TestContext) {
    ctx.fixtures
        .write_batch(
            "1700000000.json",
            &[
                item("album_1", "album", 100, "Kind of Blue"),
                item("movie_1", "movie", 200, "Heat"),
            ],
        )
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json(), &json!({ "added": 2, "error": null }));
    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_add_nothing_when_reingesting_same_file(ctx: &TestContext) {
    ctx.fixtures
        .write_batch(
            "a.json",
            &[
                item("album_1", "album", 100, "Kind of Blue"),
                item("album_2", "album", 101, "Blue Train"),
            ],
        )
        .unwrap();

    let first = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();
    assert_eq!(first.json()["added"], 2);

    // The only file is also the latest one, so it survives pruning
    assert_eq!(ctx.fixtures.batch_files().unwrap(), vec!["a.json"]);

    let second = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();
    assert_eq!(second.json(), &json!({ "added": 0, "error": null }));
    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_commit_nothing_from_file_with_invalid_record(ctx: &TestContext) {
    ctx.fixtures
        .write_batch(
            "a.json",
            &[
                item("album_1", "album", 100, "Kind of Blue"),
                item("album_2", "album", 101, "Blue Train"),
                item("album_3", "album", 102, ""),
            ],
        )
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.json();
    assert_eq!(body["added"], 0);
    let error = body["error"].as_str().expect("Expected an error");
    assert!(error.contains("a.json"), "{}", error);
    assert!(error.contains("title is required"), "{}", error);

    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 0);
    // Failed files are removed so they are not retried forever
    assert!(ctx.fixtures.batch_files().unwrap().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_missing_required_fields_in_order(ctx: &TestContext) {
    ctx.fixtures
        .write_raw("a.json", r#"{"id": "x", "title": "No type or when"}"#)
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    let error = response.json()["error"].as_str().unwrap().to_string();
    assert!(error.ends_with("ftype is required"), "{}", error);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_null_required_field_as_missing(ctx: &TestContext) {
    ctx.fixtures
        .write_raw(
            "a.json",
            r#"{"id": "x", "ftype": "album", "when": 1, "title": null}"#,
        )
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    let body = response.json();
    assert_eq!(body["added"], 0);
    let error = body["error"].as_str().unwrap().to_string();
    assert!(error.ends_with("title is required"), "{}", error);
    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_continue_after_corrupt_file(ctx: &TestContext) {
    ctx.fixtures
        .write_raw("a.json", "{\"id\": \"broken\", \"ftype\": ")
        .unwrap();
    ctx.fixtures
        .write_batch("b.json", &[item("movie_1", "movie", 200, "Heat")])
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    let body = response.json();
    assert_eq!(body["added"], 1);
    let error = body["error"].as_str().expect("Expected an error");
    assert!(error.contains("a.json"), "{}", error);
    assert!(error.contains("malformed batch record"), "{}", error);

    assert_eq!(ctx.fixtures.batch_files().unwrap(), vec!["b.json"]);
    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_only_latest_file_after_run(ctx: &TestContext) {
    ctx.fixtures
        .write_batch("a.json", &[item("album_1", "album", 100, "Kind of Blue")])
        .unwrap();
    ctx.fixtures
        .write_batch(
            "b.json",
            &[
                item("album_1", "album", 100, "Kind of Blue"),
                item("movie_1", "movie", 200, "Heat"),
            ],
        )
        .unwrap();
    ctx.fixtures
        .write_raw("notes.txt", "not a batch file")
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    assert_eq!(response.json(), &json!({ "added": 2, "error": null }));
    assert_eq!(
        ctx.fixtures.batch_files().unwrap(),
        vec!["b.json", "notes.txt"]
    );

    let data = ctx.client.get("/data/?sort=asc").await.unwrap();
    assert_eq!(ids(data.json()), vec!["album_1", "movie_1"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_duplicate_ids_within_a_file(ctx: &TestContext) {
    ctx.fixtures
        .write_batch(
            "a.json",
            &[
                item("album_1", "album", 100, "First copy"),
                item("album_1", "album", 100, "Second copy"),
            ],
        )
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    assert_eq!(response.json()["added"], 1);
    let data = ctx.client.get("/data/").await.unwrap();
    assert_eq!(data.json()[0]["title"], "First copy");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_split_records_on_complete_json_values(ctx: &TestContext) {
    // Two records on one line and one record spread over several lines
    let body = concat!(
        r#"{"id": "a", "ftype": "album", "when": 1, "title": "A"} {"id": "b", "ftype": "album", "when": 2, "title": "B"}"#,
        "\n{\"id\": \"c\",\n \"ftype\": \"album\",\n \"when\": 3,\n \"title\": \"C\"}\n"
    );
    ctx.fixtures.write_raw("a.json", body).unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    assert_eq!(response.json(), &json!({ "added": 3, "error": null }));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_file_with_malformed_release_date(ctx: &TestContext) {
    let mut bad = item("movie_2", "movie", 201, "Ronin");
    bad["release_date"] = json!("25/09/1998");
    ctx.fixtures
        .write_batch("a.json", &[item("movie_1", "movie", 200, "Heat"), bad])
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    let body = response.json();
    assert_eq!(body["added"], 0);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("invalid release_date '25/09/1998'"));
    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_let_later_file_insert_ids_from_failed_file(ctx: &TestContext) {
    ctx.fixtures
        .write_batch(
            "a.json",
            &[
                item("movie_1", "movie", 200, "Heat"),
                item("movie_2", "movie", 0, "Missing when"),
            ],
        )
        .unwrap();
    ctx.fixtures
        .write_batch("b.json", &[item("movie_1", "movie", 200, "Heat")])
        .unwrap();

    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    let body = response.json();
    assert_eq!(body["added"], 1);
    assert!(body["error"].as_str().unwrap().contains("when is required"));
    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_see_records_added_by_earlier_runs(ctx: &TestContext) {
    ctx.fixtures
        .write_batch("1.json", &[item("album_1", "album", 100, "Kind of Blue")])
        .unwrap();
    ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    ctx.fixtures
        .write_batch(
            "2.json",
            &[
                item("album_1", "album", 100, "Kind of Blue"),
                item("album_2", "album", 101, "Blue Train"),
            ],
        )
        .unwrap();
    let response = ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    assert_eq!(response.json()["added"], 1);
    assert_eq!(ctx.fixtures.batch_files().unwrap(), vec!["2.json"]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reload_everything_on_recheck(ctx: &TestContext) {
    ctx.fixtures
        .write_batch(
            "a.json",
            &[
                item("album_1", "album", 100, "Kind of Blue"),
                item("movie_1", "movie", 200, "Heat"),
            ],
        )
        .unwrap();
    ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    let response = ctx.client.post_with_auth("/recheck", TEST_SECRET).await.unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json(),
        &json!({ "removed": 2, "added": 2, "error": null })
    );
    assert_eq!(ctx.fixtures.count_items().await.unwrap(), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_clear_data_dir(ctx: &TestContext) {
    ctx.fixtures.write_batch("a.json", &[]).unwrap();
    ctx.fixtures.write_batch("b.json", &[]).unwrap();

    let response = ctx
        .client
        .post_with_auth("/clear-data-dir", TEST_SECRET)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json(), &json!({ "removed": 2 }));
    assert!(ctx.fixtures.batch_files().unwrap().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_stored_ids_and_types(ctx: &TestContext) {
    ctx.fixtures
        .write_batch(
            "a.json",
            &[
                item("movie_1", "movie", 200, "Heat"),
                item("album_1", "album", 100, "Kind of Blue"),
                item("album_2", "album", 101, "Blue Train"),
            ],
        )
        .unwrap();
    ctx.client.post_with_auth("/check", TEST_SECRET).await.unwrap();

    let response = ctx.client.get_with_auth("/data/ids", TEST_SECRET).await.unwrap();
    let mut stored: Vec<String> = serde_json::from_value(response.json().clone()).unwrap();
    stored.sort();
    assert_eq!(stored, vec!["album_1", "album_2", "movie_1"]);

    let response = ctx.client.get("/data/types").await.unwrap();
    assert_eq!(response.json(), &json!(["album", "movie"]));
}
