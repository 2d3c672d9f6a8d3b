use statetrace::Registry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

const WORKERS: usize = 4;

/// Four workers process jobs in a loop; one of them waits on a reply that
/// never arrives. Its `/worker/N/job` entry keeps growing in every dump while
/// the others churn.
pub async fn run(registry: Arc<Registry>, run_for: Duration) -> Result<(), String> {
    let (never_tx, never_rx) = oneshot::channel::<()>();
    let mut stuck_reply = Some(never_rx);

    // Upstream holds the sender forever and never replies.
    tokio::spawn(async move {
        let _never_tx = never_tx;
        std::future::pending::<()>().await;
    });

    for worker in 0..WORKERS {
        let registry = Arc::clone(&registry);
        let reply = if worker == WORKERS - 1 {
            stuck_reply.take()
        } else {
            None
        };

        tokio::spawn(async move {
            let id = format!("/worker/{worker}/job");
            if let Some(reply) = reply {
                registry.enter(id.as_str(), "waiting for reply from upstream");
                let _ = reply.await;
                registry.leave(&id);
                return;
            }

            let mut job = 0u64;
            loop {
                registry.enter(id.as_str(), format!("job #{job}"));
                tokio::time::sleep(Duration::from_millis(50)).await;
                registry.leave(&id);
                job += 1;
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });
    }

    println!("example running: /worker/{} never leaves its job", WORKERS - 1);
    tokio::time::sleep(run_for).await;
    Ok(())
}
