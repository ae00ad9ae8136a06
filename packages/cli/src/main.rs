//! `todo`: command-line client for a `Todos` remoting server.
//!
//! Every subcommand is one call through the typed client proxy:
//!
//! - **`list`**: `getTodos`
//! - **`add`**: `addTodo`
//! - **`done`**: `toggleCompleted`
//! - **`rm`**: `deleteTodo`
//! - **`clear`**: `clearCompleted`
//! - **`docs`**: read the documentation endpoint
//!
//! The server URL comes from `--url` or `TODO_URL`.

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use remoting_client::{ClientError, RemoteClient};
use todo_api::{Item, ADD_TODO, CLEAR_COMPLETED, DELETE_TODO, GET_TODOS, TOGGLE_COMPLETED};

/// todo: client for the Todos remoting API
#[derive(Parser)]
#[command(name = "todo", version, about, long_about = None)]
struct Cli {
    /// Base URL of the server.
    #[arg(long, env = "TODO_URL", default_value = "http://127.0.0.1:3000")]
    url: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every item.
    List,

    /// Add an item.
    ///
    /// Examples:
    ///   todo add "buy milk"
    ///   todo add "buy milk" --id milk
    Add {
        /// What needs doing.
        description: String,

        /// Item id. Defaults to a fresh UUIDv7.
        #[arg(long)]
        id: Option<String>,
    },

    /// Toggle an item's completed flag.
    Done {
        id: String,
    },

    /// Delete an item.
    Rm {
        id: String,
    },

    /// Remove all completed items.
    Clear,

    /// Print the API documentation as JSON.
    Docs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let contract = todo_api::contract()
        .unwrap_or_else(|e| fatal(&format!("invalid Todos contract: {e}")));
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()
        .unwrap_or_else(|e| fatal(&format!("failed to build HTTP client: {e}")));
    let client = RemoteClient::with_http(http, cli.url, contract);

    if let Err(e) = run(&client, cli.command).await {
        match e.remote_message() {
            Some(message) => fatal(message),
            None => fatal(&e.to_string()),
        }
    }
}

async fn run(client: &RemoteClient, command: Command) -> Result<(), ClientError> {
    match command {
        Command::List => print_items(&client.call(GET_TODOS, ()).await?),

        Command::Add { description, id } => {
            let id = id.unwrap_or_else(|| uuid::Uuid::now_v7().to_string());
            let item = client.call(ADD_TODO, Item::new(id, description)).await?;
            print_items(std::slice::from_ref(&item));
        }

        Command::Done { id } => {
            let item = client.call(TOGGLE_COMPLETED, id).await?;
            print_items(std::slice::from_ref(&item));
        }

        Command::Rm { id } => print_items(&client.call(DELETE_TODO, id).await?),

        Command::Clear => print_items(&client.call(CLEAR_COMPLETED, ()).await?),

        Command::Docs => {
            let doc = client.fetch_docs().await?;
            match serde_json::to_string_pretty(&doc) {
                Ok(json) => println!("{json}"),
                Err(e) => fatal(&format!("failed to render documentation: {e}")),
            }
        }
    }
    Ok(())
}

fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("(no items)");
    }
    for item in items {
        let mark = if item.completed { 'x' } else { ' ' };
        println!("[{mark}] {}  {}", item.id, item.description);
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("todo: {}", msg);
    process::exit(2);
}
