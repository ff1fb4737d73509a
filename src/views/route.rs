use reqwest::Url;

use crate::models::{PostId, TermId};
use crate::registry::ResourceType;

/// A page of the site, resolved from its URL.
///
/// Permalinks follow the registered rewrite slugs:
///
/// | URL                              | page                    |
/// |----------------------------------|-------------------------|
/// | `/`, `/projects/`                | home                    |
/// | `/projects/<id>/`                | project                 |
/// | `/todo-archive/?project=<id>`    | all todo lists          |
/// | `/todo-archive/<id>/`            | single todo             |
/// | `/todo-lists/<id>/`              | one todo list           |
/// | `/message-board/?project=<id>`   | message board           |
/// | `/message-board/<id>/`           | single message          |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Project(PostId),
    /// Root project id from `?project=`, if present.
    Lists(Option<PostId>),
    List(TermId),
    Todo(PostId),
    Board(Option<PostId>),
    Message(PostId),
}

impl Route {
    /// Resolve an absolute or site-relative URL. Unknown paths yield `None`.
    pub fn parse(url: &str) -> Option<Self> {
        let url = parse_url(url)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let slug = |resource: ResourceType| resource.schema().rewrite_slug;
        let id = |seg: &str| seg.parse::<u64>().ok().filter(|id| *id > 0);

        match segments.as_slice() {
            [] => Some(Route::Home),
            [prefix] if Some(*prefix) == slug(ResourceType::Project) => Some(Route::Home),
            [prefix] if Some(*prefix) == slug(ResourceType::Todo) => {
                Some(Route::Lists(project_param(&url)))
            }
            [prefix] if Some(*prefix) == slug(ResourceType::Message) => {
                Some(Route::Board(project_param(&url)))
            }
            [prefix, seg] if Some(*prefix) == slug(ResourceType::Project) => {
                id(seg).map(Route::Project)
            }
            [prefix, seg] if Some(*prefix) == slug(ResourceType::Todo) => id(seg).map(Route::Todo),
            [prefix, seg] if Some(*prefix) == slug(ResourceType::Message) => {
                id(seg).map(Route::Message)
            }
            [prefix, seg] if Some(*prefix) == slug(ResourceType::TodoCategory) => {
                id(seg).map(Route::List)
            }
            _ => None,
        }
    }
}

/// The root project id carried in a page URL's `?project=` parameter.
///
/// Leading digits are read as the id (`?project=12abc` is 12); an absent,
/// empty or non-numeric value means the page has no root.
pub fn project_id_from_url(url: &str) -> Option<PostId> {
    parse_url(url).as_ref().and_then(project_param)
}

fn project_param(url: &Url) -> Option<PostId> {
    let (_, value) = url.query_pairs().find(|(key, _)| key == "project")?;
    let value = value.trim_start();
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<u64>().ok().filter(|id| *id > 0)
}

fn parse_url(url: &str) -> Option<Url> {
    match Url::parse(url) {
        Ok(url) => Some(url),
        Err(_) => Url::parse("http://site.invalid/").ok()?.join(url).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/?post_type=wdm-central-project"), Some(Route::Home));
        assert_eq!(Route::parse("https://central.example/projects/"), Some(Route::Home));
    }

    #[test]
    fn entity_routes() {
        assert_eq!(Route::parse("/projects/7/"), Some(Route::Project(7)));
        assert_eq!(Route::parse("/todo-archive/40/"), Some(Route::Todo(40)));
        assert_eq!(Route::parse("/todo-lists/15"), Some(Route::List(15)));
        assert_eq!(Route::parse("/message-board/9/"), Some(Route::Message(9)));
    }

    #[test]
    fn archive_routes_carry_project_param() {
        assert_eq!(
            Route::parse("/todo-archive/?project=7"),
            Some(Route::Lists(Some(7)))
        );
        assert_eq!(
            Route::parse("https://central.example/message-board/?project=3"),
            Some(Route::Board(Some(3)))
        );
        assert_eq!(Route::parse("/message-board/"), Some(Route::Board(None)));
    }

    #[test]
    fn unknown_paths_do_not_route() {
        assert_eq!(Route::parse("/wp-admin/"), None);
        assert_eq!(Route::parse("/projects/diwali/"), None);
    }

    #[test]
    fn project_param_reads_leading_digits() {
        assert_eq!(project_id_from_url("/todo-archive/?project=12"), Some(12));
        assert_eq!(project_id_from_url("/todo-archive/?project=12abc"), Some(12));
        assert_eq!(project_id_from_url("/todo-archive/?project=abc"), None);
        assert_eq!(project_id_from_url("/todo-archive/?project="), None);
        assert_eq!(project_id_from_url("/todo-archive/"), None);
    }
}
