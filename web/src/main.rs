use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use engine::engine::Database;
use engine::sql::QueryResult;
use engine::storage::record::Row;
use serde::Deserialize;

const DEMO_TABLE: &str = "CREATE TABLE users (id INT PRIMARY KEY, name VARCHAR, email VARCHAR UNIQUE)";

/// HTTP front end for the in-memory database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Start without the demo `users` table
    #[arg(long)]
    no_demo: bool,
}

// Shared state so all web requests use the same DB instance
struct AppState {
    db: Mutex<Database>,
}

impl AppState {
    /// Every command runs under this lock, one at a time.
    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Deserialize)]
struct NewUser {
    id: i32,
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct UserId {
    id: i32,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let mut db = Database::new();
    if !args.no_demo
        && let Err(e) = db.execute_sql(DEMO_TABLE)
    {
        eprintln!("Failed to create demo table: {}", e);
    }
    let shared_state = Arc::new(AppState { db: Mutex::new(db) });

    let app = Router::new()
        .route("/", get(index))
        .route("/api/sql", post(handle_sql))
        .route(
            "/api/users",
            get(list_users).post(create_user).delete(delete_user),
        )
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    println!("Web server started on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// The body is the command text, passed through untouched.
async fn handle_sql(State(state): State<Arc<AppState>>, body: String) -> String {
    run_logged(&state, &body)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Row>>, (StatusCode, String)> {
    let result = state.db().execute_sql("SELECT * FROM users");
    match result {
        Ok(QueryResult::Data(data)) => Ok(Json(data.rows)),
        Ok(QueryResult::Message(msg)) => Err((StatusCode::INTERNAL_SERVER_ERROR, msg)),
        Err(e) => {
            eprintln!("GET /api/users failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))
        }
    }
}

async fn create_user(State(state): State<Arc<AppState>>, Json(user): Json<NewUser>) -> String {
    run_logged(&state, &insert_user_sql(&user))
}

async fn delete_user(State(state): State<Arc<AppState>>, Query(user): Query<UserId>) -> String {
    run_logged(&state, &format!("DELETE FROM users WHERE id={}", user.id))
}

fn run_logged(state: &AppState, sql: &str) -> String {
    let output = state.db().run(sql);
    if output.starts_with("Error:") {
        eprintln!("{} -> {}", sql, output);
    }
    output
}

fn insert_user_sql(user: &NewUser) -> String {
    format!(
        "INSERT INTO users (id, name, email) VALUES ({}, {}, {})",
        user.id,
        quote(&user.name),
        quote(&user.email)
    )
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}
