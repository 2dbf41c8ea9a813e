//! Walks through inserts, queries, updates and deletes against the
//! in-memory store with every built-in plugin enabled.
//!
//! Run with `cargo run -p hookstore-client --example quickstart`. Set
//! `HOOKSTORE_CONFIG` to a TOML file to choose the plugins instead.

use anyhow::{Context, Result};
use hookstore_client::{Collection, MemoryStore};
use hookstore_hooks::{HookError, OperationPhase, PluginConfig, global, init_plugins};
use hookstore_model::{Base, DefaultFields, Model, Validate};
use hookstore_types::{Filter, FindOptions, SortOrder, Update};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
struct Book {
    #[serde(flatten)]
    base: Base,
    #[validate(length(min = 1, max = 120))]
    title: String,
    #[validate(range(min = 1))]
    pages: i64,
}

impl Model for Book {
    fn as_default_fields(&mut self) -> Option<&mut dyn DefaultFields> {
        Some(&mut self.base)
    }

    fn as_validate(&self) -> Option<&dyn Validate> {
        Some(self)
    }
}

impl Book {
    fn new(title: &str, pages: i64) -> Self {
        Self {
            title: title.to_string(),
            pages,
            ..Self::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .compact()
        .init();

    let config = match std::env::var("HOOKSTORE_CONFIG") {
        Ok(path) => PluginConfig::load_from(path),
        Err(_) => PluginConfig::enable_all(),
    };
    init_plugins(&config);

    global().register(OperationPhase::BeforeDelete, "no-mass-delete", |ctx, _phase| {
        match ctx.filter.as_deref() {
            Some(filter) if !filter.is_empty() => Ok(()),
            _ => Err(HookError::rejected("delete without filter")),
        }
    });

    let books: Collection<Book, MemoryStore> = Collection::new(Arc::new(MemoryStore::new()), "books");

    let mut shelf = vec![
        Book::new("The Rust Programming Language", 560),
        Book::new("Designing Data-Intensive Applications", 616),
        Book::new("Crafting Interpreters", 640),
    ];
    let inserted = books
        .creator()
        .register_after_hooks(|ctx| {
            info!(count = ctx.inserted_ids.len(), "shelved");
            Ok(())
        })
        .insert_many(&mut shelf)
        .await
        .context("insert books")?;
    info!(ids = ?inserted.inserted_ids, "inserted");

    match books.creator().insert_one(&mut Book::new("", 0)).await {
        Err(err) if err.validation_errors().is_some() => warn!(%err, "rejected invalid book"),
        other => anyhow::bail!("expected a validation error, got {other:?}"),
    }

    let longest = books
        .finder()
        .options(FindOptions::default().sort("pages", SortOrder::Desc).limit(1))
        .find()
        .await?;
    if let Some(book) = longest.first() {
        info!(title = %book.title, "longest book");
    }

    let updated = books
        .updater()
        .filter(Filter::new().eq("title", "Crafting Interpreters"))
        .updates(Update::new().inc("pages", 10))
        .update_one()
        .await?;
    info!(modified = updated.modified_count, "updated");

    let upserted = books
        .updater()
        .filter(Filter::new().eq("title", "Programming Rust"))
        .updates(Update::new().set("pages", 735))
        .upsert()
        .await?;
    info!(id = ?upserted.upserted_id, "upserted");

    if let Err(err) = books.deleter().delete_many().await {
        warn!(%err, "unfiltered delete refused");
    }
    let removed = books
        .deleter()
        .filter(Filter::new().lt("pages", 600))
        .delete_many()
        .await?;
    info!(deleted = removed.deleted_count, "removed short books");

    let left = books.finder().count().await?;
    info!(left, "done");
    Ok(())
}
