// This main function is the entry point when running `cargo run -p web-server`.
// It reads `config.toml` from the working directory and serves the API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configuration::load_config(None)?;
    let _log_guard = configuration::init_tracing(&config.logging)?;
    web_server::run_server(&config).await
}
