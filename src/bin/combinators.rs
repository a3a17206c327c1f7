//! Weather and headlines, orchestrated with futures combinators.

use std::error::Error;
use weather_news::{Style, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    app::launch(Style::Combinators).await
}
