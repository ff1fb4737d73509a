use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wisdm_central::client::CentralClient;
use wisdm_central::config::{get_config_path, Config};
use wisdm_central::dispatch::{
    DispatchError, Dispatcher, MessageForm, ProjectForm, Submitted, TodoForm, TodoListForm,
};
use wisdm_central::views::{self, Page, Route, Screen};
use wisdm_central::{api, db, render};

#[derive(Parser)]
#[command(name = "wdmc")]
#[command(about = "Projects, todo lists and message boards on a content site")]
struct Cli {
    #[command(flatten)]
    conn: ConnArgs,

    /// Print pages as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnArgs {
    /// REST root of the host, e.g. https://example.com/wp-json
    #[arg(long, global = true)]
    url: Option<String>,

    /// Login name for application-password auth
    #[arg(long, global = true)]
    user: Option<String>,

    /// Application password
    #[arg(long, global = true)]
    password: Option<String>,

    /// Bearer token
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a local sandbox host
    Serve {
        #[arg(short, long, default_value = "17020")]
        port: u16,

        /// SQLite file (default: the user data directory)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Keep everything in memory
        #[arg(long, conflicts_with = "db")]
        memory: bool,

        /// Add a directory user; its token is printed on startup
        #[arg(long = "seed-user", value_name = "NAME")]
        seed_users: Vec<String>,
    },
    /// Save connection flags to the config file
    Configure,
    /// Your projects
    Home,
    /// A project's landing page
    Project { id: u64 },
    /// All todo lists of a project
    Lists { project: u64 },
    /// One todo list
    List { id: u64 },
    /// One todo
    Todo { id: u64 },
    /// A project's message board
    Board { project: u64 },
    /// One message
    Message { id: u64 },
    /// Open the page a site URL points at
    Open { url: String },
    NewProject {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Member user id (repeatable)
        #[arg(long = "member")]
        members: Vec<u64>,
    },
    EditProject {
        id: u64,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "member")]
        members: Vec<u64>,
    },
    NewList {
        project: u64,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    NewTodo {
        project: u64,
        list: u64,
        title: String,
        #[command(flatten)]
        details: TodoDetails,
    },
    EditTodo {
        id: u64,
        title: String,
        #[command(flatten)]
        details: TodoDetails,
    },
    /// Mark a todo done (or open again with --undo)
    Toggle {
        id: u64,
        #[arg(long)]
        undo: bool,
    },
    NewMessage {
        project: u64,
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long)]
        category: Option<u64>,
    },
    EditMessage {
        id: u64,
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
}

#[derive(Args)]
struct TodoDetails {
    #[arg(long, default_value = "")]
    notes: String,
    /// Due date, YYYY-MM-DD
    #[arg(long)]
    due: Option<NaiveDate>,
    /// Assignee user id
    #[arg(long)]
    assignee: Option<u64>,
    /// Mark the todo done
    #[arg(long)]
    done: bool,
}

impl TodoDetails {
    fn into_form(self, title: String) -> TodoForm {
        TodoForm {
            title,
            notes: self.notes,
            due_on: self.due,
            assignee: self.assignee,
            done: self.done,
        }
    }
}

/// Logs go to stderr so page output on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "wisdm_central=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(conn: ConnArgs) -> Config {
    let mut config = Config::load();
    if conn.url.is_some() {
        config.url = conn.url;
    }
    if conn.user.is_some() {
        config.user = conn.user;
    }
    if conn.password.is_some() {
        config.app_password = conn.password;
    }
    if conn.token.is_some() {
        config.token = conn.token;
    }
    config
}

fn show(page: &Page<Screen>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
    } else {
        print!("{}", render::render_page(page));
    }
    Ok(())
}

fn report<E, V>(
    result: Result<Submitted<E, V>, DispatchError>,
    wrap: fn(V) -> Screen,
    json: bool,
) -> anyhow::Result<()>
where
    E: Serialize,
    V: Serialize,
{
    match result {
        Ok(submitted) if json => {
            println!("{}", serde_json::to_string_pretty(&submitted)?);
            Ok(())
        }
        Ok(Submitted { notice, view, .. }) => {
            print!("{}", render::render_notice(&notice));
            show(&view.map(wrap), false)
        }
        Err(e) => {
            if let Some(notice) = e.notice() {
                eprint!("{}", render::render_notice(&notice));
            }
            Err(e.into())
        }
    }
}

async fn serve(
    port: u16,
    path: Option<PathBuf>,
    memory: bool,
    seed_users: Vec<String>,
) -> anyhow::Result<()> {
    let db = match (memory, path) {
        (true, _) => db::Database::open_memory()?,
        (false, Some(path)) => db::Database::open(path)?,
        (false, None) => db::Database::open_default()?,
    };
    db.migrate()?;

    for name in seed_users {
        let user = db
            .create_user(&name)
            .with_context(|| format!("Failed to add user {}", name))?;
        println!("user {} (#{}) token: {}", user.name, user.id, user.token);
    }

    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!(
        "Sandbox host listening on http://127.0.0.1:{}{}",
        port,
        api::REST_ROOT
    );

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    let config = load_config(cli.conn);
    let client = CentralClient::from_config(&config);
    let dispatcher = Dispatcher::new(client.clone());

    match cli.command {
        Commands::Serve {
            port,
            db,
            memory,
            seed_users,
        } => serve(port, db, memory, seed_users).await?,
        Commands::Configure => {
            config.save()?;
            println!("Saved {}", get_config_path()?.display());
        }
        Commands::Home => show(&views::open(&client, &Route::Home).await, json)?,
        Commands::Project { id } => show(&views::open(&client, &Route::Project(id)).await, json)?,
        Commands::Lists { project } => {
            show(&views::open(&client, &Route::Lists(Some(project))).await, json)?
        }
        Commands::List { id } => show(&views::open(&client, &Route::List(id)).await, json)?,
        Commands::Todo { id } => show(&views::open(&client, &Route::Todo(id)).await, json)?,
        Commands::Board { project } => {
            show(&views::open(&client, &Route::Board(Some(project))).await, json)?
        }
        Commands::Message { id } => show(&views::open(&client, &Route::Message(id)).await, json)?,
        Commands::Open { url } => {
            let route = Route::parse(&url)
                .with_context(|| format!("Not a page of this site: {}", url))?;
            show(&views::open(&client, &route).await, json)?
        }
        Commands::NewProject {
            name,
            description,
            members,
        } => report(
            dispatcher
                .create_project(&ProjectForm {
                    name,
                    description,
                    members,
                })
                .await,
            Screen::Home,
            json,
        )?,
        Commands::EditProject {
            id,
            name,
            description,
            members,
        } => report(
            dispatcher
                .update_project(
                    id,
                    &ProjectForm {
                        name,
                        description,
                        members,
                    },
                )
                .await,
            Screen::Project,
            json,
        )?,
        Commands::NewList {
            project,
            name,
            description,
        } => report(
            dispatcher
                .create_todo_list(project, &TodoListForm { name, description })
                .await,
            Screen::Lists,
            json,
        )?,
        Commands::NewTodo {
            project,
            list,
            title,
            details,
        } => report(
            dispatcher
                .create_todo(project, list, &details.into_form(title))
                .await,
            Screen::List,
            json,
        )?,
        Commands::EditTodo { id, title, details } => report(
            dispatcher.update_todo(id, &details.into_form(title)).await,
            Screen::Todo,
            json,
        )?,
        Commands::Toggle { id, undo } => report(
            dispatcher.toggle_todo(id, !undo).await,
            Screen::List,
            json,
        )?,
        Commands::NewMessage {
            project,
            title,
            body,
            category,
        } => report(
            dispatcher
                .create_message(
                    project,
                    &MessageForm {
                        title,
                        body,
                        category,
                    },
                )
                .await,
            Screen::Board,
            json,
        )?,
        Commands::EditMessage { id, title, body } => report(
            dispatcher
                .update_message(
                    id,
                    &MessageForm {
                        title,
                        body,
                        category: None,
                    },
                )
                .await,
            Screen::Message,
            json,
        )?,
    }

    Ok(())
}
