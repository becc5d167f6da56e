use canvas_core::{Folder, RemoteFile};
use canvas_infra::{CanvasClient, NetError};

/// Read-only view of a course's remote folder and file listings.
#[async_trait::async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn list_folders(&self, course_id: u64) -> Result<Vec<Folder>, NetError>;
    async fn list_files(&self, folder_id: u64) -> Result<Vec<RemoteFile>, NetError>;
}

#[async_trait::async_trait]
impl CourseCatalog for CanvasClient {
    async fn list_folders(&self, course_id: u64) -> Result<Vec<Folder>, NetError> {
        CanvasClient::list_folders(self, course_id).await
    }

    async fn list_files(&self, folder_id: u64) -> Result<Vec<RemoteFile>, NetError> {
        CanvasClient::list_files(self, folder_id).await
    }
}
