//! Network communication requires `http` crate feature.
//!
//! ```text
//! OKCHAIN_MNEMONIC="..." OKCHAIN_TO_ADDRESS=okchain1... \
//! OKCHAIN_ACCOUNT_NUMBER=5 OKCHAIN_SEQUENCE=7 RUST_LOG=okchain_sdk=debug \
//!     cargo run --example send --features http
//! ```

use okchain_sdk::client::{ClientConfig, OkChainClient, TxOptions};
use okchain_sdk::keys::Keybase;
use okchain_sdk::network::HttpTransport;
use tracing_subscriber::EnvFilter;

type AResult<T> = Result<T, Box<dyn std::error::Error>>;

fn env_number(key: &str) -> AResult<u64> {
    Ok(std::env::var(key)
        .map_err(|_| format!("{key} must be provided"))?
        .parse()?)
}

async fn send_and_wait() -> AResult<()> {
    let config = match std::env::var("OKCHAIN_CONFIG") {
        Ok(text) => ClientConfig::from_json(&text)?,
        Err(_) => ClientConfig::local(),
    };
    let transport = HttpTransport::from_config(&config)?;

    let keybase = Keybase::new();
    let sender = keybase.create_account_with_mnemonic(
        &std::env::var("OKCHAIN_MNEMONIC").map_err(|_| "Mnemonic must be provided")?,
        "sender",
        "demo-passphrase",
    )?;
    let recipient =
        std::env::var("OKCHAIN_TO_ADDRESS").map_err(|_| "Address must be provided")?;
    println!("Sending from {} to {}", sender.address, recipient);

    let client = OkChainClient::new(config, transport, keybase);
    let mut options = TxOptions::new(
        env_number("OKCHAIN_ACCOUNT_NUMBER")?,
        env_number("OKCHAIN_SEQUENCE")?,
    )
    .memo("sent with okchain-sdk");

    let response = client
        .send("sender", "demo-passphrase", &recipient, "1okt", &options)
        .await?;
    println!(
        "Transaction {} included into block {}",
        response.hash, response.height
    );

    // Dependent transactions need the next sequence number.
    options.sequence += 1;
    let response = client
        .new_order("sender", "demo-passphrase", "xxb_okt", "BUY", "0.1", "1", &options)
        .await?;
    println!("Placed order {:?}", response.order_id());
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    send_and_wait().await.expect("Must not fail");
}
