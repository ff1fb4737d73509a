//! Plain-text rendering of pages for the terminal.

use crate::dispatch::{Notice, NoticeKind};
use crate::models::{Member, Todo};
use crate::registry::ResourceType;
use crate::views::*;

const DONE: &str = "[x]";
const OPEN: &str = "[ ]";

/// A labelled node in a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub label: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn new(label: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }
}

/// Render nodes as an ASCII tree.
///
/// ```text
/// Diwali
/// ├── [x] Washing clothes
/// └── [ ] Cleaning
///     └── due 2024-03-05
/// ```
pub fn render_tree(nodes: &[Node]) -> String {
    let mut output = String::new();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i == nodes.len() - 1;
        render_node(&mut output, node, "", is_last, true);
    }
    output
}

fn render_node(output: &mut String, node: &Node, prefix: &str, is_last: bool, is_root: bool) {
    if is_root {
        output.push_str(&node.label);
    } else {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&node.label);
    }
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i == node.children.len() - 1;
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}

/// Drop markup from host-rendered HTML.
fn plain(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn members_line(members: &[Member]) -> String {
    if members.is_empty() {
        return "Members: none".to_string();
    }
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    format!("Members: {}", names.join(", "))
}

fn checkbox(todo: &Todo) -> &'static str {
    if todo.is_done() {
        DONE
    } else {
        OPEN
    }
}

fn todo_node(todo: &Todo, assignee: Option<&Member>) -> Node {
    let mut details = Vec::new();
    if let Some(member) = assignee {
        details.push(Node::leaf(format!("assigned to {}", member.name)));
    }
    if let Some(due) = todo.due_on() {
        details.push(Node::leaf(format!("due {}", due)));
    }
    Node::new(
        format!("{} {} (#{})", checkbox(todo), todo.title(), todo.id),
        details,
    )
}

/// Render a mounted page.
pub fn render_page(page: &Page<Screen>) -> String {
    match page {
        Page::Loading => "Loading...\n".to_string(),
        Page::Redirect(to) => format!("Not found, moved to {}\n", to),
        Page::Ready(screen) => render_screen(screen),
    }
}

pub fn render_screen(screen: &Screen) -> String {
    match screen {
        Screen::Home(view) => render_home(view),
        Screen::Project(view) => render_project(view),
        Screen::Lists(view) => render_lists(view),
        Screen::List(view) => render_list(view),
        Screen::Todo(view) => render_todo(view),
        Screen::Board(view) => render_board(view),
        Screen::Message(view) => render_message(view),
    }
}

pub fn render_home(view: &HomeView) -> String {
    let cards = view
        .projects
        .iter()
        .map(|card| {
            Node::new(
                format!("{} (#{})", card.project.name(), card.project.id),
                vec![Node::leaf(members_line(&card.members))],
            )
        })
        .collect();
    let mut out = format!("Hi {}\n\n", view.me.name);
    out.push_str(&render_tree(&[Node::new(ResourceType::Project.schema().plural, cards)]));
    out
}

pub fn render_project(view: &ProjectView) -> String {
    let mut out = render_tree(&[Node::new(
        format!("{} (#{})", view.project.name(), view.project.id),
        vec![
            Node::leaf(members_line(&view.members)),
            Node::leaf(format!("Message Board: {}", view.board_link)),
            Node::leaf(format!("To-dos: {}", view.todos_link)),
        ],
    )]);
    let description = plain(view.project.description());
    if !description.is_empty() {
        out.push('\n');
        out.push_str(&description);
        out.push('\n');
    }
    out
}

pub fn render_lists(view: &ListsView) -> String {
    let lists = view
        .lists
        .iter()
        .map(|summary| {
            Node::leaf(format!(
                "{} (#{}) {}/{} done",
                summary.list.name,
                summary.list.id,
                summary.done,
                summary.open + summary.done
            ))
        })
        .collect();
    render_tree(&[Node::new(
        format!("{} / To-dos", view.project.name()),
        lists,
    )])
}

pub fn render_list(view: &TodoListView) -> String {
    let rows = view
        .open()
        .chain(view.done())
        .map(|row| todo_node(&row.todo, row.assignee.as_ref()))
        .collect();
    let heading = match &view.project {
        Some(project) => format!("{} / {}", project.name(), view.list.name),
        None => view.list.name.clone(),
    };
    render_tree(&[Node::new(heading, rows)])
}

pub fn render_todo(view: &TodoView) -> String {
    let mut out = render_tree(&[todo_node(&view.todo, view.assignee.as_ref())]);
    if let Some(project) = &view.project {
        out.push_str(&format!("Project: {} ({})\n", project.title, project.link));
    }
    if let Some(link) = &view.list_link {
        out.push_str(&format!("List: {}\n", link));
    }
    let notes = plain(&view.todo.content.rendered);
    if !notes.is_empty() {
        out.push('\n');
        out.push_str(&notes);
        out.push('\n');
    }
    out
}

pub fn render_board(view: &BoardView) -> String {
    let messages = view
        .messages
        .iter()
        .map(|message| Node::leaf(format!("{} (#{})", message.title(), message.id)))
        .collect();
    render_tree(&[Node::new(
        format!("{} / Message Board", view.project.name()),
        messages,
    )])
}

pub fn render_message(view: &MessageView) -> String {
    let mut out = format!("{}\n", view.message.title());
    if let Some(project) = &view.project {
        out.push_str(&format!("in {} ({})\n", project.title, project.link));
    }
    let body = plain(&view.message.content.rendered);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    let mark = match notice.kind {
        NoticeKind::Success => "✓",
        NoticeKind::Error => "✗",
    };
    match &notice.title {
        Some(title) => format!("{} {} {}\n", mark, title, notice.message),
        None => format!("{} {}\n", mark, notice.message),
    }
}
