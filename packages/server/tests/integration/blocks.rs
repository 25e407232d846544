use serde_json::Value;

use crate::common::{TestApp, dxf_with_inserts, routes};

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect()
}

mod block_listing {
    use super::*;

    #[tokio::test]
    async fn pages_are_ordered_by_name() {
        let app = TestApp::spawn().await;
        app.ingest(
            "plan.dxf",
            &dxf_with_inserts(&[
                ("TABLE", "FURN", 0.0, 0.0),
                ("CHAIR", "FURN", 1.0, 0.0),
                ("DESK", "FURN", 2.0, 0.0),
            ]),
        )
        .await;

        let res = app
            .get_with_query(routes::BLOCKS, &[("page", "1"), ("per_page", "2")])
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(names(&res.body["data"]), ["CHAIR", "DESK"]);
        assert_eq!(res.body["pagination"]["page"], 1);
        assert_eq!(res.body["pagination"]["per_page"], 2);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);

        let res = app
            .get_with_query(routes::BLOCKS, &[("page", "2"), ("per_page", "2")])
            .await;
        assert_eq!(names(&res.body["data"]), ["TABLE"]);
    }

    #[tokio::test]
    async fn filters_by_file() {
        let app = TestApp::spawn().await;
        let first = app
            .ingest("first.dxf", &dxf_with_inserts(&[("CHAIR", "0", 0.0, 0.0)]))
            .await;
        app.ingest("second.dxf", &dxf_with_inserts(&[("DESK", "0", 0.0, 0.0)]))
            .await;

        let res = app
            .get_with_query(routes::BLOCKS, &[("file_id", &first.to_string())])
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(names(&res.body["data"]), ["CHAIR"]);
        assert_eq!(res.body["data"][0]["file_id"].as_i64().unwrap() as i32, first);
    }

    #[tokio::test]
    async fn empty_store_returns_empty_page() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::BLOCKS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 0);
        assert_eq!(res.body["pagination"]["page"], 1);
        assert_eq!(res.body["pagination"]["per_page"], 20);
        assert_eq!(res.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn invalid_paging_is_rejected() {
        let app = TestApp::spawn().await;

        for query in [
            [("page", "0")],
            [("per_page", "0")],
            [("per_page", "101")],
            [("page", "abc")],
        ] {
            let res = app.get_with_query(routes::BLOCKS, &query).await;
            assert_eq!(res.status, 400, "{query:?}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }
}

mod block_search {
    use super::*;

    #[tokio::test]
    async fn matches_substring_ignoring_case() {
        let app = TestApp::spawn().await;
        app.ingest(
            "plan.dxf",
            &dxf_with_inserts(&[
                ("DOOR_SINGLE", "A-DOOR", 0.0, 0.0),
                ("WINDOW", "A-GLAZ", 1.0, 0.0),
                ("DOOR_DOUBLE", "A-DOOR", 2.0, 0.0),
            ]),
        )
        .await;

        let res = app
            .get_with_query(routes::BLOCKS_SEARCH, &[("q", "door")])
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(names(&res.body), ["DOOR_DOUBLE", "DOOR_SINGLE"]);
    }

    #[tokio::test]
    async fn wildcards_are_matched_literally() {
        let app = TestApp::spawn().await;
        app.ingest(
            "plan.dxf",
            &dxf_with_inserts(&[("A%B", "0", 0.0, 0.0), ("AXB", "0", 1.0, 0.0)]),
        )
        .await;

        let res = app
            .get_with_query(routes::BLOCKS_SEARCH, &[("q", "%")])
            .await;
        assert_eq!(names(&res.body), ["A%B"]);

        let res = app
            .get_with_query(routes::BLOCKS_SEARCH, &[("q", "_")])
            .await;
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn can_be_restricted_to_a_file() {
        let app = TestApp::spawn().await;
        let first = app
            .ingest("first.dxf", &dxf_with_inserts(&[("VALVE", "0", 0.0, 0.0)]))
            .await;
        let second = app
            .ingest("second.dxf", &dxf_with_inserts(&[("VALVE", "0", 5.0, 5.0)]))
            .await;

        let res = app
            .get_with_query(
                routes::BLOCKS_SEARCH,
                &[("q", "valve"), ("file_id", &second.to_string())],
            )
            .await;

        let hits = res.body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["file_id"].as_i64().unwrap() as i32, second);
        assert_ne!(second, first);
    }

    #[tokio::test]
    async fn missing_or_blank_query_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::BLOCKS_SEARCH).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let res = app
            .get_with_query(routes::BLOCKS_SEARCH, &[("q", "   ")])
            .await;
        assert_eq!(res.status, 400);
    }
}

mod block_detail {
    use super::*;

    #[tokio::test]
    async fn includes_source_file_summary() {
        let app = TestApp::spawn().await;
        let file_id = app
            .ingest(
                "plan.dxf",
                &dxf_with_inserts(&[("MY_BLOCK", "LAYER_A", 3.5, -4.25)]),
            )
            .await;
        let listing = app
            .get_with_query(routes::BLOCKS, &[("file_id", &file_id.to_string())])
            .await;
        let block_id = listing.body["data"][0]["id"].as_i64().unwrap() as i32;

        let res = app.get(&routes::block(block_id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.id(), block_id);
        assert_eq!(res.body["name"], "MY_BLOCK");
        assert_eq!(res.body["layer"], "LAYER_A");
        assert_eq!(res.body["coordinates"]["x"].as_f64().unwrap(), 3.5);
        assert_eq!(res.body["coordinates"]["y"].as_f64().unwrap(), -4.25);
        assert_eq!(res.body["file"]["id"].as_i64().unwrap() as i32, file_id);
        assert_eq!(res.body["file"]["original_name"], "plan.dxf");
    }

    #[tokio::test]
    async fn unknown_block_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::block(424242)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert_eq!(res.body["message"], "Block with ID 424242 not found");
    }
}
