//! Weather and headlines, orchestrated with nested callbacks driving an explicit stage machine.

use std::error::Error;
use weather_news::{Style, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    app::launch(Style::Callbacks).await
}
