//! Demo command implementation.

use super::{print_state, OutputFormat};
use gardonyi_client::{
    ClientConfig, HttpTransport, LoopbackClient, StoreEvent, StoreRegistry,
};
use gardonyi_model::{EntityId, Page, Post};
use gardonyi_server::{CmsServer, ServerConfig};
use std::sync::Arc;

type Loopback = HttpTransport<LoopbackClient<Arc<CmsServer>>>;

/// Runs a scripted admin session against an in-process server.
pub async fn run(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::new("memory://");
    let server = Arc::new(CmsServer::with_default_resources(ServerConfig::default()));
    let transport = Arc::new(HttpTransport::new(&config, LoopbackClient::new(server)));
    let registry = StoreRegistry::with_default_stores(&config, transport);

    let pages = registry.store::<Page, Loopback>()?;
    let posts = registry.store::<Post, Loopback>()?;
    let mut events = pages.subscribe();

    step("create two pages and a post", format);
    let home = pages
        .create_entity(Page::new("Home", "Welcome"))
        .await?;
    pages.create_entity(Page::new("About", "Who we are")).await?;
    posts
        .create_entity(Post::new("Hello", "First post", "admin"))
        .await?;
    print_state(&pages.snapshot(), format)?;

    let id = home.id.ok_or("created page has no id")?;
    step(&format!("edit page {}", id), format);
    registry.navigate(&format!("/page/{}/edit", id)).await?;
    let patch = Page {
        id: Some(id),
        content: Some("Welcome back".into()),
        ..Page::default()
    };
    pages.partial_update_entity(patch).await?;
    print_state(&pages.snapshot(), format)?;

    step("open a missing page", format);
    if let Err(e) = registry.navigate("/page/999").await {
        println!("navigation failed: {}", e);
    }
    print_state(&pages.snapshot(), format)?;

    step("delete the about page", format);
    pages.delete_entity(EntityId::new(2)).await?;
    print_state(&pages.snapshot(), format)?;

    step("start a new post", format);
    registry.navigate("/post/new").await?;
    print_state(&posts.snapshot(), format)?;

    let mut saved = 0;
    let mut failed = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            StoreEvent::Saved(_) | StoreEvent::Deleted(_) => saved += 1,
            StoreEvent::Failed { .. } => failed += 1,
            _ => {}
        }
    }
    if format == OutputFormat::Text {
        println!();
        println!("page events: {} completed writes, {} failures", saved, failed);
    }

    Ok(())
}

fn step(title: &str, format: OutputFormat) {
    if format == OutputFormat::Text {
        println!();
        println!("== {}", title);
    }
}
