//! FoodWagen terminal client.
//!
//! Renders the home page to stdout and reads commands from stdin. Logs go to
//! stderr; set `RUST_LOG` to change the filter.

use foodwagen::console::{self, Command, HELP, Step};
use foodwagen::mocks::InMemoryFoodApi;
use foodwagen::{AppConfig, FoodApi, HomePage, HttpFoodApi, food_store};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = AppConfig::from_env()?;

    if config.offline {
        info!("Serving the built-in demo menu");
        run(InMemoryFoodApi::demo(), config.client.timeout).await
    } else {
        let api = HttpFoodApi::new(&config.client)?;
        info!(base_url = api.base_url(), timeout = ?config.client.timeout, "Using remote backend");
        run(api, config.client.timeout).await
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodwagen=info,foodwagen_runtime=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run<C>(api: C, timeout: Duration) -> Result<(), Box<dyn std::error::Error>>
where
    C: FoodApi + Clone + 'static,
{
    let store = food_store(api.clone());
    let mut page = HomePage::new(store, api).with_request_timeout(timeout);

    page.mount().await;
    println!("{}", page.render().await);
    println!("\n{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        let reply = match console::start(&mut page, command).await {
            Step::Done(reply) => reply,
            Step::Pending(pending) => {
                println!("\n{}", page.render().await);
                console::finish(&mut page, pending).await
            },
        };
        for alert in &reply.alerts {
            println!("{alert}");
        }
        if reply.quit {
            break;
        }
        if reply.redraw {
            println!("\n{}", page.render().await);
        }
    }

    info!("Bye");
    Ok(())
}
