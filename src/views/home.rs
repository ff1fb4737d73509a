use serde::Serialize;

use super::{join, Resolved};
use crate::client::{CentralClient, ClientError};
use crate::models::*;

/// The signed-in user's projects.
#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub me: User,
    pub projects: Vec<ProjectCard>,
}

/// A project with its member avatars.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectCard {
    pub project: Project,
    pub members: Vec<Member>,
}

/// Fetch order: current user, projects, user directory.
pub async fn assemble(client: &CentralClient) -> Result<Resolved<HomeView>, ClientError> {
    let me = client.current_user().await?;
    let projects = join::projects_for_member(client.list_projects().await?, me.id);
    let users = client.list_users().await?;

    let projects = projects
        .into_iter()
        .map(|project| ProjectCard {
            members: join::members(project.members(), &users, AvatarSize::Small),
            project,
        })
        .collect::<Vec<_>>();

    tracing::debug!(user = me.id, projects = projects.len(), "assembled home");
    Ok(Resolved::View(HomeView { me, projects }))
}
