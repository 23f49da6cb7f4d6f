//! Leave ("OD") requests - Submission, listing and staff decisions.
//!
//! Requests start `pending`. Staff set them to `approved` or `rejected`;
//! a decided request can be decided again, nothing locks it.
//!
//! An attachment is written before its row; if the row cannot be stored the
//! attachment is deleted again.

use crate::{
    core::blob::{BlobStore, client_file_name, sanitize_component},
    entities::{LeaveRequest, LeaveStatus, leave_request},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, warn};

/// Form fields of a new request.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub student_name: String,
    pub roll_number: String,
    pub date: String,
    pub reason: String,
}

/// A supporting document sent with a request.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Stores a new pending request, saving the attachment first if there is one.
pub async fn submit_leave_request(
    db: &DatabaseConnection,
    blobs: &BlobStore,
    request: NewLeaveRequest,
    attachment: Option<Attachment>,
) -> Result<leave_request::Model> {
    for (field, value) in [
        ("student_name", &request.student_name),
        ("roll_number", &request.roll_number),
        ("date", &request.date),
        ("reason", &request.reason),
    ] {
        if value.trim().is_empty() {
            return Err(Error::invalid_input(format!("{field} cannot be empty")));
        }
    }

    let stored = match attachment {
        Some(attachment) => {
            let stored_name = format!(
                "od_{}_{}_{}",
                sanitize_component(&request.roll_number),
                sanitize_component(&request.date),
                client_file_name(&attachment.file_name)
            );
            Some(blobs.put(&stored_name, &attachment.bytes).await?)
        }
        None => None,
    };

    let model = leave_request::ActiveModel {
        student_name: Set(request.student_name),
        roll_number: Set(request.roll_number),
        date: Set(request.date),
        reason: Set(request.reason),
        file_name: Set(stored.as_ref().map(|handle| handle.as_str().to_string())),
        status: Set(LeaveStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = match model.insert(db).await {
        Ok(created) => created,
        Err(e) => {
            if let Some(handle) = &stored {
                if let Err(cleanup) = blobs.remove(handle).await {
                    warn!(
                        "Failed to remove orphaned attachment {}: {}",
                        handle.as_str(),
                        cleanup
                    );
                }
            }
            return Err(e.into());
        }
    };
    info!("OD request {} submitted for roll {}", created.id, created.roll_number);
    Ok(created)
}

/// All requests, oldest first.
pub async fn list_leave_requests(db: &DatabaseConnection) -> Result<Vec<leave_request::Model>> {
    LeaveRequest::find()
        .order_by_asc(leave_request::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One request by id.
pub async fn get_leave_request(db: &DatabaseConnection, id: i64) -> Result<leave_request::Model> {
    LeaveRequest::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::LeaveRequestNotFound { id })
}

/// Records a staff decision. Only `approved` and `rejected` are accepted.
pub async fn update_leave_request_status(
    db: &DatabaseConnection,
    id: i64,
    status: LeaveStatus,
) -> Result<leave_request::Model> {
    if status == LeaveStatus::Pending {
        return Err(Error::invalid_input(
            "status must be 'approved' or 'rejected'",
        ));
    }

    let existing = get_leave_request(db, id).await?;
    let previous = existing.status;

    let mut active: leave_request::ActiveModel = existing.into();
    active.status = Set(status);
    let updated = active.update(db).await?;

    info!(
        "OD request {} moved from {} to {}",
        id,
        previous.as_str(),
        status.as_str()
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_submit_without_attachment() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::tempdir()?;
        let blobs = BlobStore::new(dir.path());

        let created = submit_leave_request(&db, &blobs, test_leave_request(), None).await?;
        assert_eq!(created.status, LeaveStatus::Pending);
        assert_eq!(created.student_name, "John Doe");
        assert_eq!(created.date, "2024-03-15");
        assert!(created.file_name.is_none());
        assert!(blobs.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_with_attachment_stores_blob() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::tempdir()?;
        let blobs = BlobStore::new(dir.path());

        let attachment = Attachment {
            file_name: "../letter.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let created =
            submit_leave_request(&db, &blobs, test_leave_request(), Some(attachment)).await?;

        assert_eq!(
            created.file_name.as_deref(),
            Some("od_21CS042_2024-03-15_letter.pdf")
        );
        let stored = std::fs::read(dir.path().join("od_21CS042_2024-03-15_letter.pdf"))?;
        assert_eq!(stored, b"%PDF-1.4");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_insert_removes_attachment() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::tempdir()?;
        let blobs = BlobStore::new(dir.path());
        db.execute_unprepared("DROP TABLE od_requests").await?;

        let attachment = Attachment {
            file_name: "letter.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let result =
            submit_leave_request(&db, &blobs, test_leave_request(), Some(attachment)).await;

        assert!(matches!(result, Err(Error::Database(_))));
        assert!(blobs.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_requires_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::tempdir()?;
        let blobs = BlobStore::new(dir.path());

        let mut request = test_leave_request();
        request.reason = "  ".to_string();
        let result = submit_leave_request(&db, &blobs, request, None).await;
        assert!(matches!(result, Err(Error::InvalidInput { message: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_get() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::tempdir()?;
        let blobs = BlobStore::new(dir.path());

        let first = submit_leave_request(&db, &blobs, test_leave_request(), None).await?;
        let second = submit_leave_request(&db, &blobs, test_leave_request(), None).await?;

        let all = list_leave_requests(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);

        assert_eq!(get_leave_request(&db, second.id).await?, second);
        assert!(matches!(
            get_leave_request(&db, 999).await,
            Err(Error::LeaveRequestNotFound { id: 999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_updates() -> Result<()> {
        let db = setup_test_db().await?;
        let dir = tempfile::tempdir()?;
        let blobs = BlobStore::new(dir.path());
        let created = submit_leave_request(&db, &blobs, test_leave_request(), None).await?;

        let approved = update_leave_request_status(&db, created.id, LeaveStatus::Approved).await?;
        assert_eq!(approved.status, LeaveStatus::Approved);

        // Re-deciding is permitted
        let rejected = update_leave_request_status(&db, created.id, LeaveStatus::Rejected).await?;
        assert_eq!(rejected.status, LeaveStatus::Rejected);

        let back_to_pending =
            update_leave_request_status(&db, created.id, LeaveStatus::Pending).await;
        assert!(matches!(back_to_pending, Err(Error::InvalidInput { message: _ })));

        let missing = update_leave_request_status(&db, 999, LeaveStatus::Approved).await;
        assert!(matches!(missing, Err(Error::LeaveRequestNotFound { id: 999 })));
        Ok(())
    }
}
