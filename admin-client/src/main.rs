use admin_client::{AdminSession, ClientConfig, OrderStatus, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenv::dotenv().ok();
    let config = ClientConfig::from_env();
    init_logger(&config.log_level, config.log_json)?;

    tracing::info!(api = %config.api_base_url, socket = %config.socket_addr, "Live orders starting");

    // 2. Restaurant session + room
    let admin = AdminSession::from_config(&config)?;
    let restaurant = admin.load_restaurant().await?;
    admin.mount_listeners().await;

    // 3. Initial load
    let report = admin.refresh().await?;
    if !report.is_complete() {
        tracing::warn!(failed = ?report.failed, "Initial load incomplete");
    }

    // 4. Print bucket sizes whenever the stores change
    let mut changes = admin.subscribe_changes();
    loop {
        print_summary(&admin, &restaurant.name).await;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            alive = changes.changed() => {
                if !alive {
                    break;
                }
            }
        }
    }

    admin.logout().await;
    Ok(())
}

async fn print_summary(admin: &AdminSession, name: &str) {
    let buckets = admin.orders().snapshot().await;
    let open_calls = admin.waiter_calls().open_calls().await.len();
    println!(
        "[{}] pending={} processing={} completed={} dine-in={} waiter-calls={}",
        name,
        buckets.bucket(OrderStatus::Pending).len(),
        buckets.bucket(OrderStatus::Processing).len(),
        buckets.bucket(OrderStatus::Completed).len(),
        buckets.active_dine_in.len(),
        open_calls,
    );
}
