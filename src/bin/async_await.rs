//! Weather and headlines, orchestrated with linear async/await.

use std::error::Error;
use weather_news::{Style, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    app::launch(Style::AsyncAwait).await
}
