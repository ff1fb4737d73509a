use serde::Serialize;

use super::{ProjectRef, Resolved};
use crate::client::{CentralClient, ClientError, Found};
use crate::models::*;

/// A single message with its project link.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub message: Message,
    pub project: Option<ProjectRef>,
    pub people: Vec<Member>,
}

/// Fetch order: user directory, the message, its project.
pub async fn assemble(
    client: &CentralClient,
    message_id: PostId,
) -> Result<Resolved<MessageView>, ClientError> {
    let users = client.list_users().await?;
    let Some(message) = client.get_message(message_id).await.found()? else {
        return Ok(Resolved::Missing);
    };
    let project = match message.project() {
        Some(id) => client.get_project(id).await.found()?,
        None => None,
    };

    Ok(Resolved::View(MessageView {
        message,
        project: project.as_ref().map(ProjectRef::from),
        people: users
            .iter()
            .map(|user| Member::from_user(user, AvatarSize::Small))
            .collect(),
    }))
}
