use facet::Facet;
use statetrace::{Props, Registry};
use std::sync::Arc;
use std::time::Duration;

#[derive(Facet)]
struct RequestMeta {
    method: String,
    path: String,
    attempt: u32,
}

/// Fires requests with growing latencies so the duration order puts the
/// slowest ones first.
pub async fn run(registry: Arc<Registry>, run_for: Duration) -> Result<(), String> {
    let mut handles = Vec::new();

    for request in 0u64..16 {
        let registry = Arc::clone(&registry);
        let latency = Duration::from_millis(100 * (request + 1) * (request + 1));
        handles.push(tokio::spawn(async move {
            let id = format!("/http/request/{request}");
            let meta = RequestMeta {
                method: "GET".to_string(),
                path: format!("/items/{request}"),
                attempt: 1,
            };
            registry.enter(id.as_str(), Props::from_facet(&meta));
            tokio::time::sleep(latency).await;
            registry.leave(&id);
        }));
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    tokio::time::sleep(run_for).await;
    let finished = handles.iter().filter(|h| h.is_finished()).count();
    println!("{finished}/{} requests finished", handles.len());
    Ok(())
}
