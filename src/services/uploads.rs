//! Course image uploads.
//!
//! Streams the multipart body to disk chunk by chunk so large bodies
//! never sit in memory, enforcing the configured size cap as bytes
//! arrive. Images land in the configured upload directory named after
//! the course id, so re-uploading replaces the previous image.

use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{courses, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::course::CourseResponse;

const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_course_image);
}

fn image_extension(filename: &str) -> Result<String, AppError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .ok_or_else(|| AppError::InvalidInput("image file needs an extension".into()))?;

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "unsupported image type '{ext}'; allowed: png, jpg, jpeg, gif"
        )));
    }
    Ok(ext)
}

/// File left behind by a previous upload, when the new one lands under
/// a different name (same course id, different extension). Only the
/// final path component of the stored image path is trusted.
fn stale_image_file(upload_dir: &Path, old_image_path: &str, stored_name: &str) -> Option<PathBuf> {
    let old_name = Path::new(old_image_path).file_name()?;
    if old_name == std::ffi::OsStr::new(stored_name) {
        return None;
    }
    Some(upload_dir.join(old_name))
}

/// Upload or replace a course's image.
///
/// POST /api/v1/courses/{id}/image
#[post("/courses/{id}/image")]
pub async fn upload_course_image(
    auth: AuthUser,
    path: web::Path<Uuid>,
    mut payload: Multipart,
    config: web::Data<Config>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let course_id = path.into_inner();

    let course = courses::find_by_id(pool.connection(), course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("course".into()))?;

    // Only the owner or an admin may change the image; hide the course
    // from everyone else
    if course.owner_id != auth.0.id && !auth.0.is_admin() {
        return Err(AppError::NotFound("course".into()));
    }

    let mut field = payload
        .try_next()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart body: {e}")))?
        .ok_or_else(|| AppError::InvalidInput("no file in upload".into()))?;

    let filename = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .ok_or_else(|| AppError::InvalidInput("upload is missing a filename".into()))?
        .to_owned();

    let ext = image_extension(&filename)?;

    let stored_name = format!("{course_id}.{ext}");
    let dest_path = config.upload_dir.join(&stored_name);

    let mut file = tokio::fs::File::create(&dest_path)
        .await
        .map_err(|e| AppError::FileSystem(format!("creating {}: {e}", dest_path.display())))?;

    let mut written: usize = 0;
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::InvalidInput(format!("upload stream error: {e}")))?
    {
        written += chunk.len();
        if written > config.max_image_size {
            drop(file);
            let _ = tokio::fs::remove_file(&dest_path).await;
            return Err(AppError::InvalidInput(format!(
                "image exceeds the {} byte limit",
                config.max_image_size
            )));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::FileSystem(format!("writing {}: {e}", dest_path.display())))?;
    }

    file.flush()
        .await
        .map_err(|e| AppError::FileSystem(format!("flushing {}: {e}", dest_path.display())))?;

    if written == 0 {
        let _ = tokio::fs::remove_file(&dest_path).await;
        return Err(AppError::InvalidInput("uploaded file is empty".into()));
    }

    let image_path = format!("/uploads/{stored_name}");
    let updated = courses::set_image_path(pool.connection(), course_id, &image_path).await?;

    // Drop the previous image so replaced files do not pile up
    if let Some(ref old) = course.image_path
        && let Some(stale) = stale_image_file(&config.upload_dir, old, &stored_name)
        && let Err(e) = tokio::fs::remove_file(&stale).await
    {
        tracing::warn!("could not remove replaced image {}: {}", stale.display(), e);
    }

    let card_count = courses::count_cards(pool.connection(), course_id).await?;

    tracing::info!("course {} image updated ({} bytes)", course_id, written);

    Ok(HttpResponse::Ok().json(CourseResponse::from_model(updated, card_count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_image_extensions() {
        assert_eq!(image_extension("photo.PNG").unwrap(), "png");
        assert_eq!(image_extension("a.b.jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn rejects_unknown_or_missing_extensions() {
        assert!(image_extension("malware.exe").is_err());
        assert!(image_extension("noextension").is_err());
        assert!(image_extension("script.svg").is_err());
    }

    #[test]
    fn replacing_an_image_targets_the_old_file() {
        let dir = Path::new("/srv/uploads");
        let stale = stale_image_file(dir, "/uploads/abc.png", "abc.jpg");
        assert_eq!(stale, Some(PathBuf::from("/srv/uploads/abc.png")));
    }

    #[test]
    fn reupload_under_the_same_name_removes_nothing() {
        let dir = Path::new("/srv/uploads");
        assert_eq!(stale_image_file(dir, "/uploads/abc.png", "abc.png"), None);
    }

    #[test]
    fn stale_lookup_only_trusts_the_file_name() {
        let dir = Path::new("/srv/uploads");
        let stale = stale_image_file(dir, "/uploads/../../etc/passwd", "abc.png");
        assert_eq!(stale, Some(PathBuf::from("/srv/uploads/passwd")));
    }
}
