use statetrace::Registry;
use std::sync::Arc;
use std::time::Duration;

/// Opens connections with scoped guards, but every third one is handed off
/// with `forget()` and nobody leaves it. The leaked `/conn/N` entries pile up.
pub async fn run(registry: Arc<Registry>, run_for: Duration) -> Result<(), String> {
    let deadline = tokio::time::Instant::now() + run_for;
    let mut conn = 0u64;

    while tokio::time::Instant::now() < deadline {
        let guard = registry.enter_scoped(
            format!("/conn/{conn}"),
            format!("peer 10.0.0.{}", conn % 255),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        if conn % 3 == 0 {
            guard.forget();
        }
        conn += 1;
    }

    println!("opened {conn} connections, {} leaked", conn.div_ceil(3));
    Ok(())
}
