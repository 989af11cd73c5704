//! Record commands: list, get, create, update, patch and delete.

use super::{print_record, print_records, EntityKind, FieldArgs, OutputFormat};
use gardonyi_client::{EntityStore, HttpClient, HttpTransport, StoreRegistry};
use gardonyi_model::{EntityId, Page, Post, Record};
use gardonyi_protocol::Sort;
use std::sync::Arc;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn store<R: Record, C: HttpClient + 'static>(
    registry: &StoreRegistry,
) -> Result<Arc<EntityStore<R, HttpTransport<C>>>, Box<dyn std::error::Error>> {
    Ok(registry.store::<R, HttpTransport<C>>()?)
}

/// Runs the list command.
pub async fn list<C: HttpClient + 'static>(
    registry: &StoreRegistry,
    entity: EntityKind,
    page: u32,
    size: Option<u32>,
    sort: Option<Sort>,
    format: OutputFormat,
) -> CliResult {
    match entity {
        EntityKind::Page => list_records::<Page, C>(registry, page, size, sort, format).await,
        EntityKind::Post => list_records::<Post, C>(registry, page, size, sort, format).await,
    }
}

async fn list_records<R: Record, C: HttpClient + 'static>(
    registry: &StoreRegistry,
    page: u32,
    size: Option<u32>,
    sort: Option<Sort>,
    format: OutputFormat,
) -> CliResult {
    let store = store::<R, C>(registry)?;
    let mut query = store.current_query();
    query.page = page;
    if let Some(size) = size {
        query.size = size;
    }
    if let Some(sort) = sort {
        query = query.with_sort(sort);
    }

    let result = store.list(query).await?;
    print_records(&result.items, result.total_count, format)
}

/// Runs the get command.
pub async fn get<C: HttpClient + 'static>(
    registry: &StoreRegistry,
    entity: EntityKind,
    id: EntityId,
    format: OutputFormat,
) -> CliResult {
    match entity {
        EntityKind::Page => {
            let record = store::<Page, C>(registry)?.get_entity(id).await?;
            print_record(&record, format)
        }
        EntityKind::Post => {
            let record = store::<Post, C>(registry)?.get_entity(id).await?;
            print_record(&record, format)
        }
    }
}

/// Runs the create command.
pub async fn create<C: HttpClient + 'static>(
    registry: &StoreRegistry,
    entity: EntityKind,
    fields: &FieldArgs,
    format: OutputFormat,
) -> CliResult {
    match entity {
        EntityKind::Page => {
            let created = store::<Page, C>(registry)?
                .create_entity(fields.to_page())
                .await?;
            print_record(&created, format)
        }
        EntityKind::Post => {
            let created = store::<Post, C>(registry)?
                .create_entity(fields.to_post())
                .await?;
            print_record(&created, format)
        }
    }
}

/// Runs the update command, or the patch command if `partial` is set.
pub async fn update<C: HttpClient + 'static>(
    registry: &StoreRegistry,
    entity: EntityKind,
    id: EntityId,
    fields: &FieldArgs,
    partial: bool,
    format: OutputFormat,
) -> CliResult {
    match entity {
        EntityKind::Page => {
            save::<Page, C>(registry, fields.to_page().with_id(id), partial, format).await
        }
        EntityKind::Post => {
            save::<Post, C>(registry, fields.to_post().with_id(id), partial, format).await
        }
    }
}

async fn save<R: Record, C: HttpClient + 'static>(
    registry: &StoreRegistry,
    record: R,
    partial: bool,
    format: OutputFormat,
) -> CliResult {
    let store = store::<R, C>(registry)?;
    let saved = if partial {
        store.partial_update_entity(record).await?
    } else {
        store.update_entity(record).await?
    };
    print_record(&saved, format)
}

/// Runs the delete command.
pub async fn delete<C: HttpClient + 'static>(
    registry: &StoreRegistry,
    entity: EntityKind,
    id: EntityId,
    format: OutputFormat,
) -> CliResult {
    let name = match entity {
        EntityKind::Page => {
            store::<Page, C>(registry)?.delete_entity(id).await?;
            Page::ENTITY_NAME
        }
        EntityKind::Post => {
            store::<Post, C>(registry)?.delete_entity(id).await?;
            Post::ENTITY_NAME
        }
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "deleted": name, "id": id })),
        OutputFormat::Text => println!("deleted {} {}", name, id),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gardonyi_client::{ClientConfig, LoopbackClient};
    use gardonyi_server::{CmsServer, ServerConfig};

    type Loopback = LoopbackClient<Arc<CmsServer>>;

    fn registry() -> StoreRegistry {
        let config = ClientConfig::default();
        let server = Arc::new(CmsServer::with_default_resources(ServerConfig::default()));
        let transport = Arc::new(HttpTransport::new(&config, LoopbackClient::new(server)));
        StoreRegistry::with_default_stores(&config, transport)
    }

    #[tokio::test]
    async fn create_patch_delete() {
        let registry = registry();
        let fields = FieldArgs {
            title: Some("Home".into()),
            content: Some("Welcome".into()),
            author: None,
        };
        create::<Loopback>(&registry, EntityKind::Page, &fields, OutputFormat::Json)
            .await
            .unwrap();

        let patch = FieldArgs {
            content: Some("Changed".into()),
            ..FieldArgs::default()
        };
        let id = EntityId::new(1);
        update::<Loopback>(&registry, EntityKind::Page, id, &patch, true, OutputFormat::Text)
            .await
            .unwrap();

        let pages = registry.store::<Page, HttpTransport<Loopback>>().unwrap();
        let page = pages.get_entity(id).await.unwrap();
        assert_eq!(page.title.as_deref(), Some("Home"));
        assert_eq!(page.content.as_deref(), Some("Changed"));

        delete::<Loopback>(&registry, EntityKind::Page, id, OutputFormat::Text)
            .await
            .unwrap();
        assert!(get::<Loopback>(&registry, EntityKind::Page, id, OutputFormat::Text)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn list_applies_paging_flags() {
        let registry = registry();
        crate::commands::seed::<Loopback>(&registry).await.unwrap();

        list::<Loopback>(
            &registry,
            EntityKind::Page,
            0,
            Some(1),
            Some(Sort::desc("title")),
            OutputFormat::Text,
        )
        .await
        .unwrap();

        let pages = registry.store::<Page, HttpTransport<Loopback>>().unwrap();
        let state = pages.snapshot();
        assert_eq!(state.entities().len(), 1);
        assert_eq!(state.entities()[0].title.as_deref(), Some("Home"));
        assert_eq!(state.total_items(), 2);
    }
}
