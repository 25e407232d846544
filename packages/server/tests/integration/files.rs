use crate::common::{MAX_UPLOAD_SIZE, TestApp, dxf_with_inserts, routes};

mod upload {
    use super::*;

    #[tokio::test]
    async fn accepted_upload_completes_with_blocks() {
        let app = TestApp::spawn().await;
        let text = dxf_with_inserts(&[("MY_BLOCK", "0", 10.0, 20.0)]);

        let res = app.upload("plan.dxf", text.into_bytes()).await;

        assert_eq!(res.status, 202, "{}", res.text);
        assert_eq!(
            res.body["message"].as_str().unwrap(),
            "File upload accepted, processing started."
        );
        assert_eq!(res.body["file"]["original_name"], "plan.dxf");
        assert_eq!(res.body["file"]["status"], "processing");
        let stored = res.body["file"]["stored_name"].as_str().unwrap();
        assert!(stored.ends_with(".dxf"), "{stored}");

        let id = res.body["file"]["id"].as_i64().unwrap() as i32;
        assert_eq!(app.wait_for_status(id).await, "completed");

        let blocks = app
            .get_with_query(routes::BLOCKS, &[("file_id", &id.to_string())])
            .await;
        assert_eq!(blocks.status, 200);
        let data = blocks.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"], "MY_BLOCK");
        assert_eq!(data[0]["layer"], "0");
        assert_eq!(data[0]["coordinates"]["x"].as_f64().unwrap(), 10.0);
        assert_eq!(data[0]["coordinates"]["y"].as_f64().unwrap(), 20.0);
        assert_eq!(data[0]["coordinates"]["z"].as_f64().unwrap(), 0.0);
    }

    #[tokio::test]
    async fn upload_is_removed_after_ingestion() {
        let app = TestApp::spawn().await;
        let text = dxf_with_inserts(&[("DOOR", "A-DOOR", 1.0, 2.0)]);

        let res = app.upload("doors.dxf", text.into_bytes()).await;
        assert_eq!(res.status, 202);
        let id = res.body["file"]["id"].as_i64().unwrap() as i32;
        assert_eq!(app.wait_for_status(id).await, "completed");

        let handle = ::common::storage::UploadHandle::parse(
            res.body["file"]["stored_name"].as_str().unwrap(),
        )
        .unwrap();
        assert!(!app.uploads.exists(&handle).await.unwrap());
    }

    #[tokio::test]
    async fn extension_check_ignores_case() {
        let app = TestApp::spawn().await;
        let text = dxf_with_inserts(&[("WINDOW", "A-GLAZ", 0.0, 0.0)]);

        let res = app.upload("SITE.DXF", text.into_bytes()).await;

        assert_eq!(res.status, 202, "{}", res.text);
    }

    #[tokio::test]
    async fn drawing_without_inserts_completes_empty() {
        let app = TestApp::spawn().await;
        let text = "0\nSECTION\n2\nENTITIES\n0\nLINE\n8\n0\n10\n0.0\n20\n0.0\n\
                    11\n1.0\n21\n1.0\n0\nENDSEC\n0\nEOF\n";

        let id = app.ingest("lines.dxf", text).await;

        let blocks = app
            .get_with_query(routes::BLOCKS, &[("file_id", &id.to_string())])
            .await;
        assert_eq!(blocks.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn unparsable_drawing_is_marked_failed() {
        let app = TestApp::spawn().await;

        let res = app
            .upload("broken.dxf", b"this is not a drawing".to_vec())
            .await;
        assert_eq!(res.status, 202);
        let id = res.body["file"]["id"].as_i64().unwrap() as i32;

        assert_eq!(app.wait_for_status(id).await, "failed");

        let blocks = app
            .get_with_query(routes::BLOCKS, &[("file_id", &id.to_string())])
            .await;
        assert_eq!(blocks.body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn non_dxf_extension_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("plan.dwg", b"binary".to_vec()).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["message"], "Only .dxf files are allowed");

        let files = app.get(routes::FILES).await;
        assert_eq!(files.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_field("drawing", "plan.dxf", b"0\nEOF\n".to_vec())
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn path_in_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload("../plan.dxf", b"0\nEOF\n".to_vec()).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let app = TestApp::spawn().await;
        let data = vec![b'0'; MAX_UPLOAD_SIZE as usize + 1];

        let res = app.upload("huge.dxf", data).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod status {
    use super::*;

    #[tokio::test]
    async fn unknown_file_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::file_status(99999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        assert_eq!(res.body["message"], "File not found");
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app.get("/api/v1/files/abc/status").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn status_reports_name_and_outcome() {
        let app = TestApp::spawn().await;
        let id = app
            .ingest("plan.dxf", &dxf_with_inserts(&[("MY_BLOCK", "0", 1.0, 1.0)]))
            .await;

        let res = app.get(&routes::file_status(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.id(), id);
        assert_eq!(res.body["status"], "completed");
        assert_eq!(res.body["original_name"], "plan.dxf");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn lists_newest_first() {
        let app = TestApp::spawn().await;
        let first = app
            .ingest("first.dxf", &dxf_with_inserts(&[("A", "0", 0.0, 0.0)]))
            .await;
        let second = app
            .ingest("second.dxf", &dxf_with_inserts(&[("B", "0", 0.0, 0.0)]))
            .await;

        let res = app.get(routes::FILES).await;

        assert_eq!(res.status, 200);
        let files = res.body.as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["id"].as_i64().unwrap() as i32, second);
        assert_eq!(files[1]["id"].as_i64().unwrap() as i32, first);
        assert_eq!(files[0]["status"], "completed");
    }
}
