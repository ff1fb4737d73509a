use serde::Serialize;

use super::{join, Resolved};
use crate::client::{CentralClient, ClientError, Found};
use crate::models::*;

/// A project's message board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub project: Project,
    pub members: Vec<Member>,
    pub messages: Vec<Message>,
}

/// Fetch order: project, user directory, messages.
///
/// The host has no server-side filter on `acf.project`, so the whole message
/// collection is fetched and filtered here.
pub async fn assemble(
    client: &CentralClient,
    project_id: Option<PostId>,
) -> Result<Resolved<BoardView>, ClientError> {
    let Some(project_id) = project_id else {
        return Ok(Resolved::Missing);
    };
    let Some(project) = client.get_project(project_id).await.found()? else {
        return Ok(Resolved::Missing);
    };
    let users = client.list_users().await?;
    let messages = join::messages_of(project.id, client.list_messages().await?);

    Ok(Resolved::View(BoardView {
        members: join::members(project.members(), &users, AvatarSize::Small),
        project,
        messages,
    }))
}
