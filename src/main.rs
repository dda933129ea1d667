use clap::{Parser, Subcommand};
use log::debug;

use todo_client::api::ApiClient;
use todo_client::auth::AuthController;
use todo_client::config::Config;
use todo_client::error::ClientError;
use todo_client::models::{Filter, RegisterInput, TaskId};
use todo_client::pages::{AuthEvent, AuthPage, AuthUpdate, PageUpdate, TaskEvent, TaskPage};
use todo_client::storage::{FileStore, SessionStore};
use todo_client::tasks::TaskManager;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "To-do list client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "TODO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Must repeat the password
        #[arg(long)]
        confirm: String,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show tasks
    List {
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },
    /// Add a task
    Add {
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Flip a task between open and completed
    Toggle { id: TaskId },
    /// Delete a task
    Delete { id: TaskId },
    /// Delete every completed task
    ClearCompleted,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let api = ApiClient::from_config(&config);
    let sessions = SessionStore::new(FileStore::open(&config.store_path)?);
    debug!("Using API at {}", api.base_url());

    let event = match cli.command {
        Command::Login { username, password } => {
            let mut page = AuthPage::new(AuthController::new(api, sessions));
            if show_auth(page.dispatch(AuthEvent::Loaded).await) {
                show_auth(
                    page.dispatch(AuthEvent::LoginSubmitted { username, password })
                        .await,
                );
            }
            return Ok(());
        }
        Command::Register {
            username,
            email,
            password,
            confirm,
        } => {
            let mut page = AuthPage::new(AuthController::new(api, sessions));
            if show_auth(page.dispatch(AuthEvent::Loaded).await) {
                let input = RegisterInput {
                    username,
                    email,
                    password,
                    password_confirm: confirm,
                };
                show_auth(page.dispatch(AuthEvent::RegisterSubmitted(input)).await);
            }
            return Ok(());
        }
        Command::Logout => TaskEvent::LogoutClicked,
        Command::List { filter } => TaskEvent::FilterSelected(filter),
        Command::Add { title } => TaskEvent::Submitted(title.join(" ")),
        Command::Toggle { id } => TaskEvent::TitleClicked(id),
        Command::Delete { id } => TaskEvent::DeleteClicked(id),
        Command::ClearCompleted => TaskEvent::ClearCompletedClicked,
    };

    let mut page = TaskPage::new(TaskManager::new(api, sessions));
    let loaded = page.dispatch(TaskEvent::Loaded).await;
    // Logging out must still work when the list could not be fetched.
    let stop = loaded.redirect.is_some()
        || (loaded.notice.is_some() && event != TaskEvent::LogoutClicked);
    if stop {
        show_tasks(loaded);
        return Ok(());
    }
    show_tasks(page.dispatch(event).await);
    Ok(())
}

/// Prints the update. Returns `false` when the page navigated away.
fn show_auth(update: AuthUpdate) -> bool {
    if let Some(notice) = &update.notice {
        println!("{}", notice);
    }
    if update.switch_to_login.is_some() {
        println!("Sign in with `todo login`.");
    }
    match update.redirect {
        Some(redirect) => {
            println!("-> {}", redirect.to);
            false
        }
        None => true,
    }
}

fn show_tasks(update: PageUpdate) {
    if let Some(view) = &update.view {
        print!("{}", view);
    }
    if let Some(notice) = &update.notice {
        println!("{}", notice);
    }
    if let Some(redirect) = update.redirect {
        println!("-> {}", redirect.to);
    }
}
