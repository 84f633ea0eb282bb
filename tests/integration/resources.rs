//! Resource clients against a mock Canvas

use crate::mock_server::MockServerFixture;
use canvas_lms_client::client::OverrideDates;
use canvas_lms_client::settings::{CourseList, ListSettings, SubmissionList};
use canvas_lms_client::types::{
    AssessmentRubric, Assignment, FileUpload, LatePolicyStatus, SubmissionFile, SubmissionRubric,
};
use canvas_lms_client::{CancellationToken, Error};
use chrono::{TimeZone, Utc};
use futures::TryStreamExt;
use mockito::Matcher;
use serde_json::json;
use tokio_test::assert_ok;

const SUBMISSION: &str = "/api/v1/courses/1/assignments/2/submissions/3";

#[tokio::test]
async fn test_current_user() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json("GET", "/api/v1/users/self", r#"{"id":42,"name":"Jane Doe","display_name":"Jane"}"#)
        .await;

    let client = fixture.client();
    let user = assert_ok!(client.current_user().get(&CancellationToken::new()).await);
    let user = user.unwrap();
    assert_eq!(user.id, 42);
    assert_eq!(user.display_name(), "Jane");
}

#[tokio::test]
async fn test_courses_always_include_the_term() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_page(
            "/api/v1/courses?per_page=50&include[]=term",
            r#"[{"id":1,"name":"Maths","workflow_state":"available","term":{"id":7,"name":"2026"}}]"#,
            None,
        )
        .await;

    let client = fixture.client();
    let courses: Vec<_> = assert_ok!(
        client
            .courses()
            .list_for_current_user(&CourseList::new(), &CancellationToken::new())
            .try_collect()
            .await
    );

    assert_eq!(courses.len(), 1);
    assert!(courses[0].is_available());
    assert_eq!(courses[0].term.as_ref().map(|t| t.id), Some(7));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_accounts_list() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_page("/api/v1/accounts?per_page=50", r#"[{"id":1,"name":"Root"},{"id":2,"name":"Faculty"}]"#, None)
        .await;

    let client = fixture.client();
    let accounts: Vec<_> = assert_ok!(
        client
            .accounts()
            .list_for_current_user(&ListSettings::new(), &CancellationToken::new())
            .try_collect()
            .await
    );
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].name, "Faculty");
}

#[tokio::test]
async fn test_terms_for_account() {
    let mut fixture = MockServerFixture::new().await;
    let _list = fixture
        .mock_page(
            "/api/v1/accounts/1/terms?per_page=50",
            r#"{"enrollment_terms":[{"id":3,"name":"Autumn","start_at":"2026-02-01T00:00:00Z"}]}"#,
            None,
        )
        .await;
    let _item = fixture
        .mock_json("GET", "/api/v1/accounts/1/terms/3", r#"{"id":3,"name":"Autumn"}"#)
        .await;

    let client = fixture.client();
    let cancel = CancellationToken::new();
    let terms: Vec<_> = assert_ok!(
        client
            .accounts()
            .terms()
            .list_for_account(1, &ListSettings::new(), &cancel)
            .try_collect()
            .await
    );
    assert_eq!(terms.len(), 1);
    assert!(terms[0].when_starts.is_some());

    let term = assert_ok!(client.accounts().terms().retrieve(1, 3, &cancel).await);
    assert_eq!(term.map(|t| t.name), Some("Autumn".to_string()));
}

#[tokio::test]
async fn test_create_assignment_requires_a_name() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = fixture.client();
    let err = client
        .courses()
        .assignments()
        .create(1, &Assignment::new("  "), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_assignment() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/api/v1/courses/1/assignments")
        .match_body(Matcher::PartialJson(json!({"assignment": {"name": "Essay"}})))
        .with_status(201)
        .with_body(r#"{"id":99,"name":"Essay","published":false}"#)
        .create_async()
        .await;

    let client = fixture.client();
    let created = assert_ok!(
        client
            .courses()
            .assignments()
            .create(1, &Assignment::new("Essay"), &CancellationToken::new())
            .await
    );
    assert_eq!(created.id, 99);
    assert_eq!(created.course_id, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_submissions_include_user_and_are_tagged() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_page(
            "/api/v1/courses/1/assignments/2/submissions?per_page=50&include[]=user",
            r#"[{"id":5,"user_id":3,"user":{"id":3,"name":"Sam"},"late":true}]"#,
            None,
        )
        .await;

    let client = fixture.client();
    let submissions: Vec<_> = assert_ok!(
        client
            .courses()
            .assignments()
            .list_submissions(1, 2, &SubmissionList::new(), &CancellationToken::new())
            .try_collect()
            .await
    );

    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].course_id, 1);
    assert_eq!(submissions[0].assignment_id, 2);
    assert!(submissions[0].was_submitted_late);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_summary_is_an_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_error("GET", "/api/v1/courses/1/assignments/2/submission_summary", 404, "{}")
        .await;

    let client = fixture.client();
    let err = client
        .courses()
        .assignments()
        .retrieve_submission_summary(1, 2, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingEntity { .. }));
}

#[tokio::test]
async fn test_add_comment_with_file() {
    let mut fixture = MockServerFixture::new().await;
    let slot = format!(
        r#"{{"upload_url":"{}","upload_params":{{}}}}"#,
        fixture.url("/storage/upload")
    );
    let start = fixture
        .mock_json("POST", &format!("{}/comments/files", SUBMISSION), &slot)
        .await;
    let _transfer = fixture
        .mock_json("POST", "/storage/upload", r#"{"id":77}"#)
        .await;
    let comment = fixture
        .server
        .mock("PUT", SUBMISSION)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("comment[text_comment]".into(), "See attached".into()),
            Matcher::UrlEncoded("comment[file_ids][]".into(), "77".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"id":5}"#)
        .create_async()
        .await;

    let client = fixture.client();
    let submission = assert_ok!(
        client
            .courses()
            .assignments()
            .add_comment(
                1,
                2,
                3,
                "See attached",
                Some(FileUpload::from_bytes("feedback.txt", "well done")),
                &CancellationToken::new(),
            )
            .await
    );
    assert_eq!(submission.id, 5);
    assert_eq!(submission.assignment_id, 2);
    start.assert_async().await;
    comment.assert_async().await;
}

#[tokio::test]
async fn test_mark_submission() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PUT", SUBMISSION)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("submission[posted_grade]".into(), "8.5".into()),
            Matcher::UrlEncoded("comment[text_comment]".into(), "Good".into()),
            Matcher::UrlEncoded("rubric_assessment[crit_1][points]".into(), "4".into()),
            Matcher::UrlEncoded("rubric_assessment[crit_1][rating_id]".into(), "r2".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"id":5,"score":8.5}"#)
        .create_async()
        .await;

    let mut rubric = SubmissionRubric::new();
    rubric.insert(
        "crit_1".to_string(),
        AssessmentRubric {
            points: Some(4.0),
            id: Some("r2".to_string()),
            comments: None,
        },
    );

    let client = fixture.client();
    let submission = assert_ok!(
        client
            .courses()
            .assignments()
            .mark_submission(1, 2, 3, Some(8.5), Some("Good"), Some(&rubric), &CancellationToken::new())
            .await
    );
    assert_eq!(submission.score, Some(8.5));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_mark_submission_with_nothing_to_send() {
    let fixture = MockServerFixture::new().await;
    let client = fixture.client();
    let err = client
        .courses()
        .assignments()
        .mark_submission(1, 2, 3, None, Some(""), None, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
}

#[tokio::test]
async fn test_update_submission_lateness() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PUT", SUBMISSION)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("submission[late_policy_status]".into(), "late".into()),
            Matcher::UrlEncoded("submission[seconds_late_override]".into(), "3600".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"id":5,"late_policy_status":"late","seconds_late":3600}"#)
        .create_async()
        .await;

    let client = fixture.client();
    let submission = assert_ok!(
        client
            .courses()
            .assignments()
            .update_submission_lateness(1, 2, 3, LatePolicyStatus::Late, Some(3600), &CancellationToken::new())
            .await
    );
    assert_eq!(submission.late_policy_status, Some(LatePolicyStatus::Late));
    assert_eq!(submission.lateness_in_seconds, Some(3600));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_section_override_round_trip() {
    let mut fixture = MockServerFixture::new().await;
    let create = fixture
        .server
        .mock("POST", "/api/v1/courses/1/assignments/2/overrides")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("assignment_override[course_section_id]".into(), "12".into()),
            Matcher::UrlEncoded("assignment_override[due_at]".into(), "2026-05-01T23:59:00Z".into()),
        ]))
        .with_status(201)
        .with_body(r#"{"id":30,"course_section_id":12,"due_at":"2026-05-01T23:59:00Z"}"#)
        .create_async()
        .await;
    let update = fixture
        .server
        .mock("PUT", "/api/v1/courses/1/assignments/2/overrides/30")
        .match_body(Matcher::UrlEncoded(
            "assignment_override[lock_at]".into(),
            "2026-05-08T00:00:00Z".into(),
        ))
        .with_status(200)
        .with_body(r#"{"id":30}"#)
        .create_async()
        .await;

    let client = fixture.client();
    let assignments = client.courses().assignments();
    let cancel = CancellationToken::new();

    let due = OverrideDates {
        due: Some(Utc.with_ymd_and_hms(2026, 5, 1, 23, 59, 0).unwrap()),
        ..OverrideDates::default()
    };
    let created = assert_ok!(assignments.add_override_for_section(1, 2, 12, due, &cancel).await);
    assert_eq!(created.id, 30);
    assert_eq!(created.course_id, 1);

    let lock = OverrideDates {
        lock: Some(Utc.with_ymd_and_hms(2026, 5, 8, 0, 0, 0).unwrap()),
        ..OverrideDates::default()
    };
    let updated = assert_ok!(assignments.update_override(1, 2, 30, lock, &cancel).await);
    assert_eq!(updated.assignment_id, 2);

    create.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_upload_submission() {
    let mut fixture = MockServerFixture::new().await;
    let slot = format!(
        r#"{{"upload_url":"{}","upload_params":{{"key":"k"}}}}"#,
        fixture.url("/storage/upload")
    );
    let _start = fixture
        .mock_json("POST", &format!("{}/files", SUBMISSION), &slot)
        .await;
    let _transfer = fixture
        .mock_json("POST", "/storage/upload", r#"{"id":81}"#)
        .await;
    let submit = fixture
        .server
        .mock("POST", "/api/v1/courses/1/assignments/2/submissions")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("submission[submission_type]".into(), "online_upload".into()),
            Matcher::UrlEncoded("submission[file_ids][]".into(), "81".into()),
            Matcher::UrlEncoded("submission[user_id]".into(), "3".into()),
        ]))
        .with_status(201)
        .with_body(r#"{"id":6,"user_id":3}"#)
        .create_async()
        .await;

    let client = fixture.client();
    let submission = assert_ok!(
        client
            .courses()
            .assignments()
            .upload_submission(1, 2, 3, FileUpload::from_bytes("essay.txt", "words"), &CancellationToken::new())
            .await
    );
    assert_eq!(submission.user_id, Some(3));
    submit.assert_async().await;
}

#[tokio::test]
async fn test_download_submission_as_string() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/files/9/download")
        .with_status(200)
        .with_body("essay text")
        .create_async()
        .await;

    let file = SubmissionFile {
        id: Some(9),
        filename: "essay.txt".to_string(),
        url: fixture.url("/files/9/download"),
        when_uploaded: None,
    };

    let client = fixture.client();
    let text = assert_ok!(
        client
            .courses()
            .assignments()
            .download_submission_as_string(&file, &CancellationToken::new())
            .await
    );
    assert_eq!(text, "essay text");
}
