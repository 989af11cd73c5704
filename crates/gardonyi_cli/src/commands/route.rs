//! Route command implementation.

use super::{print_state, OutputFormat};
use gardonyi_client::{HttpClient, HttpTransport, StoreRegistry};
use gardonyi_model::{Page, Post, Record};

/// Enters `path` and prints the state of the selected store.
pub async fn run<C: HttpClient + 'static>(
    registry: &StoreRegistry,
    path: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let route = registry.navigate(path).await?;
    if format == OutputFormat::Text {
        println!("route {}", route);
    }

    if route.entity == Page::ENTITY_NAME {
        let store = registry.store::<Page, HttpTransport<C>>()?;
        print_state(&store.snapshot(), format)
    } else if route.entity == Post::ENTITY_NAME {
        let store = registry.store::<Post, HttpTransport<C>>()?;
        print_state(&store.snapshot(), format)
    } else {
        Err(format!("no view for entity {}", route.entity).into())
    }
}
