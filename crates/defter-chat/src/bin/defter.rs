//! Line-oriented terminal driver for the notes chat.
//!
//! Every stdin line is one chat message. Lines starting with `/` are driver
//! commands: `/notlar`, `/sil <id>`, `/çıkış` (or `/exit`).

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use defter_chat::{ChatConfig, ChatOrchestrator, NoteStore};
use defter_db::{create_pool, MemoryNoteStore, PgNoteStore};
use defter_inference::InferenceConfig;

/// Every workspace crate at INFO, everything else at WARN.
const DEFAULT_LOG_FILTER: &str =
    "warn,defter=info,defter_chat=info,defter_search=info,defter_inference=info,defter_db=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: DEFAULT_LOG_FILTER)
    // Console logs go to stderr; stdout carries chat replies only.
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("defter.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );

    let chat_config = ChatConfig::load().context("loading chat configuration")?;
    let inference_config = InferenceConfig::load().context("loading inference configuration")?;
    let model = inference_config
        .build()
        .context("building language model backend")?;

    let store: Arc<dyn NoteStore> = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let pool = create_pool(&url)
                .await
                .context("connecting to PostgreSQL")?;
            let store = PgNoteStore::new(pool);
            store.migrate().await.context("running migrations")?;
            info!(store = "postgres", "Note store ready");
            Arc::new(store)
        }
        _ => {
            warn!(store = "memory", "DATABASE_URL not set, notes are kept in memory only");
            Arc::new(MemoryNoteStore::new())
        }
    };

    let chat = ChatOrchestrator::new(Arc::clone(&store), model, &chat_config);

    println!("defter hazır. Çıkmak için /çıkış yazın.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        match line.trim() {
            "/çıkış" | "/exit" => break,
            "/notlar" => print_notes(store.as_ref()).await,
            cmd if cmd.starts_with("/sil") => {
                delete_note(store.as_ref(), cmd.trim_start_matches("/sil").trim()).await
            }
            _ => println!("{}\n", chat.handle(line).await),
        }
    }

    info!("Shutting down");
    Ok(())
}

async fn print_notes(store: &dyn NoteStore) {
    match store.list().await {
        Ok(notes) if notes.is_empty() => println!("Henüz hiç not yok.\n"),
        Ok(notes) => {
            for note in notes {
                println!(
                    "{}  {}  {}",
                    note.id,
                    note.created_at.format("%d.%m.%Y %H:%M"),
                    note.title
                );
            }
            println!();
        }
        Err(e) => {
            warn!(error_kind = e.kind(), error = %e, "Listing notes failed");
            println!("Notlar listelenemedi: {}\n", e);
        }
    }
}

async fn delete_note(store: &dyn NoteStore, arg: &str) {
    let id = match Uuid::parse_str(arg) {
        Ok(id) => id,
        Err(_) => {
            println!("Kullanım: /sil <not-id>\n");
            return;
        }
    };

    match store.delete(id).await {
        Ok(()) => println!("Not silindi.\n"),
        Err(e) => {
            warn!(error_kind = e.kind(), error = %e, %id, "Deleting note failed");
            println!("Not silinemedi: {}\n", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn test_default_log_filter_covers_every_crate() {
        let directives: Vec<&str> = DEFAULT_LOG_FILTER.split(',').collect();
        for target in [
            "defter",
            "defter_chat",
            "defter_search",
            "defter_inference",
            "defter_db",
        ] {
            assert!(
                directives.contains(&format!("{}=info", target).as_str()),
                "{} missing from default log filter",
                target
            );
        }
        assert_eq!(directives[0], "warn");
    }
}
