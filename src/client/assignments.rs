use crate::error::ErrorContext;
use crate::params::Parameters;
use crate::settings::{AssignmentItem, AssignmentList, ListSettings, SubmissionInclude, SubmissionList, ToParameters};
use crate::transport::{cancellable, Connection, TransportError};
use crate::types::{
    Assignment, AssignmentDate, FileUpload, LatePolicyStatus, PeerReview, Submission,
    SubmissionFile, SubmissionRubric, SubmissionSummary,
};
use crate::{BoxStream, Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::{StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Serialize)]
struct AssignmentBody<'a> {
    assignment: &'a Assignment,
}

/// The part of an uploaded file record needed to attach it elsewhere.
#[derive(Deserialize)]
struct UploadedFile {
    id: u64,
}

/// Dates applied by an assignment override. Unset dates are left out of the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideDates {
    pub due: Option<DateTime<Utc>>,
    pub unlock: Option<DateTime<Utc>>,
    pub lock: Option<DateTime<Utc>>,
}

impl OverrideDates {
    fn append_to(&self, form: &mut Parameters) {
        let fields = [
            ("assignment_override[due_at]", self.due),
            ("assignment_override[unlock_at]", self.unlock),
            ("assignment_override[lock_at]", self.lock),
        ];
        for (name, date) in fields {
            if let Some(date) = date {
                form.push(name, date.to_rfc3339_opts(SecondsFormat::Secs, true));
            }
        }
    }
}

/// Assignments, their overrides and submissions within courses.
#[derive(Debug, Clone, Copy)]
pub struct Assignments<'a> {
    connection: &'a Connection,
}

impl<'a> Assignments<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    pub async fn create(
        &self,
        course_id: u64,
        assignment: &Assignment,
        cancel: &CancellationToken,
    ) -> Result<Assignment> {
        require_name(assignment)?;
        debug!(course_id, name = %assignment.name, "Creating assignment");
        let created: Option<Assignment> = self
            .connection
            .post_json(
                &format!("api/v1/courses/{}/assignments", course_id),
                &AssignmentBody { assignment },
                cancel,
            )
            .await?;
        let mut created = created.ok_or_else(|| Error::missing_entity("No assignment returned from Canvas"))?;
        created.course_id = course_id;
        Ok(created)
    }

    pub async fn update(
        &self,
        course_id: u64,
        assignment_id: u64,
        assignment: &Assignment,
        cancel: &CancellationToken,
    ) -> Result<Assignment> {
        require_name(assignment)?;
        debug!(course_id, assignment_id, name = %assignment.name, "Updating assignment");
        let updated: Option<Assignment> = self
            .connection
            .put_json(
                &format!("api/v1/courses/{}/assignments/{}", course_id, assignment_id),
                &AssignmentBody { assignment },
                cancel,
            )
            .await?;
        let mut updated = updated.ok_or_else(|| Error::missing_entity("No assignment returned from Canvas"))?;
        updated.course_id = course_id;
        Ok(updated)
    }

    pub async fn retrieve(
        &self,
        course_id: u64,
        assignment_id: u64,
        settings: &AssignmentItem,
        cancel: &CancellationToken,
    ) -> Result<Option<Assignment>> {
        debug!(course_id, assignment_id, "Retrieving assignment");
        let assignment: Option<Assignment> = self
            .connection
            .retrieve(
                &format!("api/v1/courses/{}/assignments/{}", course_id, assignment_id),
                &settings.to_parameters(),
                cancel,
            )
            .await?;
        Ok(assignment.map(|mut a| {
            a.course_id = course_id;
            a
        }))
    }

    pub fn list_for_course(
        &self,
        course_id: u64,
        settings: &AssignmentList,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, Assignment> {
        debug!(course_id, "Listing assignments for course");
        let items = self
            .connection
            .list::<Assignment>(&format!("api/v1/courses/{}/assignments", course_id), settings, cancel)
            .map_ok(move |mut a| {
                a.course_id = course_id;
                a
            });
        Box::pin(items)
    }

    pub fn list_override_dates(
        &self,
        course_id: u64,
        assignment_id: u64,
        settings: &ListSettings,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, AssignmentDate> {
        debug!(course_id, assignment_id, "Listing override dates for assignment");
        let items = self
            .connection
            .list::<AssignmentDate>(
                &format!("api/v1/courses/{}/assignments/{}/overrides", course_id, assignment_id),
                settings,
                cancel,
            )
            .map_ok(move |mut d| {
                d.course_id = course_id;
                d.assignment_id = assignment_id;
                d
            });
        Box::pin(items)
    }

    pub fn list_peer_reviews(
        &self,
        course_id: u64,
        assignment_id: u64,
        settings: &ListSettings,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, PeerReview> {
        debug!(course_id, assignment_id, "Listing peer reviews for assignment");
        let items = self
            .connection
            .list::<PeerReview>(
                &format!("api/v1/courses/{}/assignments/{}/peer_reviews", course_id, assignment_id),
                settings,
                cancel,
            )
            .map_ok(move |mut r| {
                r.course_id = course_id;
                r.assignment_id = assignment_id;
                r
            });
        Box::pin(items)
    }

    /// Submissions always include the submitting user.
    pub fn list_submissions(
        &self,
        course_id: u64,
        assignment_id: u64,
        settings: &SubmissionList,
        cancel: &CancellationToken,
    ) -> BoxStream<'a, Submission> {
        let settings = settings
            .clone()
            .with_options(settings.options | SubmissionInclude::User);
        debug!(course_id, assignment_id, "Listing submissions for assignment");
        let items = self
            .connection
            .list::<Submission>(
                &format!("api/v1/courses/{}/assignments/{}/submissions", course_id, assignment_id),
                &settings,
                cancel,
            )
            .map_ok(move |s| tag_submission(s, course_id, assignment_id));
        Box::pin(items)
    }

    pub async fn retrieve_submission(
        &self,
        course_id: u64,
        assignment_id: u64,
        user_id: u64,
        settings: &SubmissionList,
        cancel: &CancellationToken,
    ) -> Result<Option<Submission>> {
        debug!(course_id, assignment_id, user_id, "Retrieving submission");
        let submission: Option<Submission> = self
            .connection
            .retrieve(
                &submission_url(course_id, assignment_id, user_id),
                &settings.to_parameters(),
                cancel,
            )
            .await?;
        Ok(submission.map(|s| tag_submission(s, course_id, assignment_id)))
    }

    pub async fn retrieve_submission_summary(
        &self,
        course_id: u64,
        assignment_id: u64,
        cancel: &CancellationToken,
    ) -> Result<SubmissionSummary> {
        debug!(course_id, assignment_id, "Retrieving submission summary");
        let summary: Option<SubmissionSummary> = self
            .connection
            .retrieve(
                &format!(
                    "api/v1/courses/{}/assignments/{}/submission_summary",
                    course_id, assignment_id
                ),
                &Parameters::new(),
                cancel,
            )
            .await?;
        let mut summary = summary.ok_or_else(|| Error::missing_entity("No summary returned from Canvas"))?;
        summary.course_id = course_id;
        summary.assignment_id = assignment_id;
        Ok(summary)
    }

    /// Comment on a student's submission, optionally attaching a file.
    pub async fn add_comment(
        &self,
        course_id: u64,
        assignment_id: u64,
        student_id: u64,
        comment: &str,
        file: Option<FileUpload>,
        cancel: &CancellationToken,
    ) -> Result<Submission> {
        let url = submission_url(course_id, assignment_id, student_id);
        let mut form = Parameters::new().add("comment[text_comment]", comment);
        if let Some(file) = file {
            debug!(course_id, assignment_id, student_id, "Uploading comment file");
            let uploaded = self.upload(&format!("{}/comments/files", url), file, cancel).await?;
            form.push("comment[file_ids][]", uploaded.id);
        }

        debug!(course_id, assignment_id, student_id, "Adding comment to submission");
        self.update_submission(&url, &form, course_id, assignment_id, cancel)
            .await
    }

    /// Grade a submission and optionally leave a comment or rubric assessment.
    pub async fn mark_submission(
        &self,
        course_id: u64,
        assignment_id: u64,
        student_id: u64,
        mark: Option<f64>,
        comment: Option<&str>,
        rubric: Option<&SubmissionRubric>,
        cancel: &CancellationToken,
    ) -> Result<Submission> {
        let mut form = Parameters::new();
        if let Some(mark) = mark {
            form.push("submission[posted_grade]", mark.to_string());
        }
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            form.push("comment[text_comment]", comment);
        }
        if let Some(rubric) = rubric {
            let mut criteria: Vec<_> = rubric.iter().collect();
            criteria.sort_by(|a, b| a.0.cmp(b.0));
            for (criterion, assessment) in criteria {
                if let Some(points) = assessment.points {
                    form.push(format!("rubric_assessment[{}][points]", criterion), points.to_string());
                }
                if let Some(rating) = &assessment.id {
                    form.push(format!("rubric_assessment[{}][rating_id]", criterion), rating.as_str());
                }
                if let Some(comments) = &assessment.comments {
                    form.push(format!("rubric_assessment[{}][comments]", criterion), comments.as_str());
                }
            }
        }
        if form.is_empty() {
            return Err(Error::validation_with_context(
                "Nothing to update: provide a mark, a comment or a rubric",
                ErrorContext::new().with_source("assignments_client"),
            ));
        }

        debug!(course_id, assignment_id, student_id, "Marking submission");
        let url = submission_url(course_id, assignment_id, student_id);
        self.update_submission(&url, &form, course_id, assignment_id, cancel)
            .await
    }

    /// Set the late policy status of a submission. `seconds_late` only applies
    /// to [`LatePolicyStatus::Late`].
    pub async fn update_submission_lateness(
        &self,
        course_id: u64,
        assignment_id: u64,
        student_id: u64,
        status: LatePolicyStatus,
        seconds_late: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Submission> {
        let mut form = Parameters::new().add_enum("submission[late_policy_status]", status);
        if let (LatePolicyStatus::Late, Some(seconds)) = (status, seconds_late) {
            form.push("submission[seconds_late_override]", seconds);
        }

        debug!(course_id, assignment_id, student_id, ?status, "Updating submission lateness");
        let url = submission_url(course_id, assignment_id, student_id);
        self.update_submission(&url, &form, course_id, assignment_id, cancel)
            .await
    }

    pub async fn add_override_for_section(
        &self,
        course_id: u64,
        assignment_id: u64,
        section_id: u64,
        dates: OverrideDates,
        cancel: &CancellationToken,
    ) -> Result<AssignmentDate> {
        let mut form = Parameters::new().add("assignment_override[course_section_id]", section_id);
        dates.append_to(&mut form);

        debug!(course_id, assignment_id, section_id, "Adding assignment override");
        let created: Option<AssignmentDate> = self
            .connection
            .post_form(
                &format!("api/v1/courses/{}/assignments/{}/overrides", course_id, assignment_id),
                &form,
                cancel,
            )
            .await?;
        tag_override(created, course_id, assignment_id)
    }

    pub async fn update_override(
        &self,
        course_id: u64,
        assignment_id: u64,
        override_id: u64,
        dates: OverrideDates,
        cancel: &CancellationToken,
    ) -> Result<AssignmentDate> {
        let mut form = Parameters::new();
        dates.append_to(&mut form);

        debug!(course_id, assignment_id, override_id, "Updating assignment override");
        let updated: Option<AssignmentDate> = self
            .connection
            .put_form(
                &format!(
                    "api/v1/courses/{}/assignments/{}/overrides/{}",
                    course_id, assignment_id, override_id
                ),
                &form,
                cancel,
            )
            .await?;
        tag_override(updated, course_id, assignment_id)
    }

    /// Upload a file and submit it on behalf of a student.
    pub async fn upload_submission(
        &self,
        course_id: u64,
        assignment_id: u64,
        student_id: u64,
        file: FileUpload,
        cancel: &CancellationToken,
    ) -> Result<Submission> {
        debug!(course_id, assignment_id, student_id, file = %file.name, "Uploading submission file");
        let uploaded = self
            .upload(
                &format!("{}/files", submission_url(course_id, assignment_id, student_id)),
                file,
                cancel,
            )
            .await?;

        let form = Parameters::new()
            .add("submission[submission_type]", "online_upload")
            .add("submission[file_ids][]", uploaded.id)
            .add("submission[user_id]", student_id);
        let submission: Option<Submission> = self
            .connection
            .post_form(
                &format!("api/v1/courses/{}/assignments/{}/submissions", course_id, assignment_id),
                &form,
                cancel,
            )
            .await?;
        submission
            .map(|s| tag_submission(s, course_id, assignment_id))
            .ok_or_else(|| Error::missing_entity("No submission returned from Canvas"))
    }

    pub async fn download_submission_as_string(
        &self,
        file: &SubmissionFile,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let mut buf = Vec::new();
        self.download_submission_to_writer(file, &mut buf, cancel).await?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Stream a submitted file into `writer`, returning the number of bytes written.
    pub async fn download_submission_to_writer<W>(
        &self,
        file: &SubmissionFile,
        writer: &mut W,
        cancel: &CancellationToken,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        debug!(url = %file.url, "Downloading submission");
        let response = self.connection.get(&file.url, true, cancel).await?;
        let mut body = Box::pin(response.bytes_stream());
        let mut written = 0u64;
        while let Some(chunk) = cancellable(cancel, async { Ok(body.next().await) }).await? {
            let chunk = chunk.map_err(TransportError::Http)?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }

    pub async fn download_submission_to_file(
        &self,
        file: &SubmissionFile,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let mut out = tokio::fs::File::create(path).await?;
        self.download_submission_to_writer(file, &mut out, cancel).await
    }

    async fn upload(&self, url: &str, file: FileUpload, cancel: &CancellationToken) -> Result<UploadedFile> {
        let args = file.upload_args();
        self.connection.upload_file(url, &args, file, cancel).await
    }

    async fn update_submission(
        &self,
        url: &str,
        form: &Parameters,
        course_id: u64,
        assignment_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Submission> {
        let submission: Option<Submission> = self.connection.put_form(url, form, cancel).await?;
        submission
            .map(|s| tag_submission(s, course_id, assignment_id))
            .ok_or_else(|| Error::missing_entity("No submission returned from Canvas"))
    }
}

fn require_name(assignment: &Assignment) -> Result<()> {
    if assignment.name.trim().is_empty() {
        return Err(Error::validation_with_context(
            "Assignments must have a name",
            ErrorContext::new()
                .with_field_path("assignment.name")
                .with_source("assignments_client"),
        ));
    }
    Ok(())
}

fn submission_url(course_id: u64, assignment_id: u64, user_id: u64) -> String {
    format!(
        "api/v1/courses/{}/assignments/{}/submissions/{}",
        course_id, assignment_id, user_id
    )
}

fn tag_submission(mut submission: Submission, course_id: u64, assignment_id: u64) -> Submission {
    submission.course_id = course_id;
    submission.assignment_id = assignment_id;
    submission
}

fn tag_override(date: Option<AssignmentDate>, course_id: u64, assignment_id: u64) -> Result<AssignmentDate> {
    let mut date = date.ok_or_else(|| Error::missing_entity("No override returned from Canvas"))?;
    date.course_id = course_id;
    date.assignment_id = assignment_id;
    Ok(date)
}
