use serde::Serialize;

use super::{join, Resolved};
use crate::client::{CentralClient, ClientError, Found};
use crate::models::*;
use crate::registry::ResourceType;

/// A project's landing page.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub project: Project,
    pub members: Vec<Member>,
    /// Message board of the project.
    pub board_link: String,
    /// All todo lists of the project.
    pub todos_link: String,
}

/// Fetch order: project, user directory.
pub async fn assemble(
    client: &CentralClient,
    project_id: PostId,
) -> Result<Resolved<ProjectView>, ClientError> {
    let Some(project) = client.get_project(project_id).await.found()? else {
        return Ok(Resolved::Missing);
    };
    let users = client.list_users().await?;

    Ok(Resolved::View(ProjectView {
        members: join::members(project.members(), &users, AvatarSize::Large),
        board_link: archive_link(ResourceType::Message, project.id),
        todos_link: archive_link(ResourceType::Todo, project.id),
        project,
    }))
}

/// `/<rewrite-slug>/?project=<id>` for a post type's per-project archive.
fn archive_link(post_type: ResourceType, project: PostId) -> String {
    let slug = post_type.schema().rewrite_slug.unwrap_or_default();
    format!("/{}/?project={}", slug, project)
}
