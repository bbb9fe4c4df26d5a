use std::env;
use std::error::Error;

use tracing_appender::non_blocking::WorkerGuard;
use vault_api::VaultClient;
use vault_api::secret::KvData;

const DEFAULT_KV_MOUNT: &str = "secret";

/// Read one KV v2 secret and print its data as JSON.
///
/// Usage: vault-demo <secret-path> [version]
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _guard = init_logger()?;

    let mut args = env::args().skip(1);
    let secret_path = args.next().ok_or("usage: vault-demo <secret-path> [version]")?;
    let version = args.next().map(|v| v.parse::<u64>()).transpose()?;
    let mount = env::var("VAULT_KV_MOUNT").unwrap_or_else(|_| DEFAULT_KV_MOUNT.to_string());

    let (client, _token_manager) = VaultClient::builder()
        .application_name(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build_with_login()
        .await?;
    tracing::info!(address = client.address(), namespace = ?client.namespace(), "Logged in to Vault");

    let secret: KvData = client
        .secret()
        .kv2()
        .with_mount(&mount)
        .read(&secret_path, version)
        .await?;
    tracing::info!(
        path = %secret_path,
        version = secret.metadata.version,
        "Secret read"
    );

    println!("{}", serde_json::to_string_pretty(&secret.data)?);
    Ok(())
}

fn init_logger() -> Result<Option<WorkerGuard>, Box<dyn Error>> {
    use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
    use tracing_log::LogTracer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{EnvFilter, Registry};

    if !env::var("JSON_LOG").map_or(false, |s| s.parse().unwrap_or_default()) {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    // Redirect the logs from log library to tracing's subscribers.
    LogTracer::init()?;

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

    // Non-blocking stderr writer, stdout carries the secret
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(JsonStorageLayer)
        .with(bunyan_formatting_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(Some(guard))
}
