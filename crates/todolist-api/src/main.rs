use todolist_api::setup;
use todolist_core::Config;

// Use mimalloc as the global allocator for lower fragmentation, especially on
// musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router, pool) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router, pool).await?;

    Ok(())
}
