//! The three-step file upload

use crate::mock_server::{MockServerFixture, TOKEN};
use canvas_lms_client::types::FileUpload;
use canvas_lms_client::{CancellationToken, Error, UploadStage};
use mockito::{Matcher, Mock};
use serde_json::Value;
use tokio_test::assert_ok;

const START: &str = "/api/v1/files";

impl MockServerFixture {
    async fn mock_upload_start(&mut self) -> Mock {
        let body = format!(
            r#"{{"upload_url":"{}","upload_params":{{"key":"abc/notes.txt","expires":1700000000,"acl":null}}}}"#,
            self.url("/storage/upload")
        );
        self.server
            .mock("POST", START)
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "notes.txt".into()),
                Matcher::UrlEncoded("size".into(), "5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// Mocks that fail the test if any request beyond the expected ones arrives.
    async fn mock_no_other_calls(&mut self) -> Vec<Mock> {
        let mut mocks = Vec::new();
        for method in ["GET", "POST", "PUT"] {
            mocks.push(
                self.server
                    .mock(method, Matcher::Any)
                    .expect(0)
                    .create_async()
                    .await,
            );
        }
        mocks
    }
}

async fn assert_all(mocks: &[Mock]) {
    for mock in mocks {
        mock.assert_async().await;
    }
}

fn notes() -> FileUpload {
    FileUpload::from_bytes("notes.txt", "hello")
}

fn upload_stage(err: &Error) -> Option<UploadStage> {
    match err {
        Error::Upload { stage, .. } => Some(*stage),
        _ => None,
    }
}

#[tokio::test]
async fn test_transfer_returning_the_entity() {
    let mut fixture = MockServerFixture::new().await;
    let start = fixture.mock_upload_start().await;
    let transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .match_header("authorization", Matcher::Missing)
        .match_header("content-type", Matcher::Regex("^multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="key"\s+abc/notes.txt"#.into()),
            Matcher::Regex(r#"name="expires"\s+1700000000"#.into()),
            Matcher::Regex(r#"name="file"; filename="notes.txt""#.into()),
            Matcher::Regex("hello".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"id":55,"display_name":"notes.txt"}"#)
        .expect(1)
        .create_async()
        .await;
    let others = fixture.mock_no_other_calls().await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let created: Value = assert_ok!(
        conn.upload_file(START, &args, file, &CancellationToken::new())
            .await
    );

    assert_eq!(created["id"], 55);
    start.assert_async().await;
    transfer.assert_async().await;
    assert_all(&others).await;
}

#[tokio::test]
async fn test_transfer_redirecting_to_the_entity() {
    let mut fixture = MockServerFixture::new().await;
    let start = fixture.mock_upload_start().await;
    let location = fixture.url("/api/v1/files/55");
    let transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .with_status(302)
        .with_header("location", &location)
        .expect(1)
        .create_async()
        .await;
    let confirm = fixture
        .server
        .mock("GET", "/api/v1/files/55")
        .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
        .with_status(200)
        .with_body(r#"{"id":55}"#)
        .expect(1)
        .create_async()
        .await;
    let others = fixture.mock_no_other_calls().await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let created: Value = assert_ok!(
        conn.upload_file(START, &args, file, &CancellationToken::new())
            .await
    );

    assert_eq!(created["id"], 55);
    start.assert_async().await;
    transfer.assert_async().await;
    confirm.assert_async().await;
    assert_all(&others).await;
}

#[tokio::test]
async fn test_unparseable_confirmation_fails_to_finalize() {
    let mut fixture = MockServerFixture::new().await;
    let _start = fixture.mock_upload_start().await;
    let location = fixture.url("/api/v1/files/55");
    let _transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .with_status(302)
        .with_header("location", &location)
        .create_async()
        .await;
    let _confirm = fixture
        .server
        .mock("GET", "/api/v1/files/55")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let err = conn
        .upload_file::<Value>(START, &args, file, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(upload_stage(&err), Some(UploadStage::Finalize));
}

#[tokio::test]
async fn test_unparseable_transfer_body_fails_to_finalize() {
    let mut fixture = MockServerFixture::new().await;
    let _start = fixture.mock_upload_start().await;
    let _transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .with_status(200)
        .with_body("<html>ok</html>")
        .create_async()
        .await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let err = conn
        .upload_file::<Value>(START, &args, file, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(upload_stage(&err), Some(UploadStage::Finalize));
}

#[tokio::test]
async fn test_missing_upload_url_fails_to_initiate() {
    let mut fixture = MockServerFixture::new().await;
    let _start = fixture.mock_json("POST", START, r#"{"upload_params":{}}"#).await;
    let transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .expect(0)
        .create_async()
        .await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let err = conn
        .upload_file::<Value>(START, &args, file, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(upload_stage(&err), Some(UploadStage::Initiate));
    transfer.assert_async().await;
}

#[tokio::test]
async fn test_storage_failure_fails_the_transfer() {
    let mut fixture = MockServerFixture::new().await;
    let _start = fixture.mock_upload_start().await;
    let _transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .with_status(500)
        .create_async()
        .await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let err = conn
        .upload_file::<Value>(START, &args, file, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(upload_stage(&err), Some(UploadStage::Transfer));
}

#[tokio::test]
async fn test_redirect_without_location_fails_to_finalize() {
    let mut fixture = MockServerFixture::new().await;
    let _start = fixture.mock_upload_start().await;
    let _transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .with_status(201)
        .create_async()
        .await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let err = conn
        .upload_file::<Value>(START, &args, file, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(upload_stage(&err), Some(UploadStage::Finalize));
}

#[tokio::test]
async fn test_unreadable_location_fails_to_finalize() {
    let mut fixture = MockServerFixture::new().await;
    let _start = fixture.mock_upload_start().await;
    let location = fixture.url("/api/v1/files/55");
    let _transfer = fixture
        .server
        .mock("POST", "/storage/upload")
        .with_status(302)
        .with_header("location", &location)
        .create_async()
        .await;
    let _confirm = fixture
        .mock_error("GET", "/api/v1/files/55", 404, r#"{"errors":[{"message":"not found"}]}"#)
        .await;

    let conn = fixture.connection();
    let file = notes();
    let args = file.upload_args();
    let err = conn
        .upload_file::<Value>(START, &args, file, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(upload_stage(&err), Some(UploadStage::Finalize));
    assert!(err.to_string().contains("/api/v1/files/55"));
}
