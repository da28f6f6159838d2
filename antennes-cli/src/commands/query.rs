use anyhow::{Context, Result};
use antennes::{store::supports_in, BoundingBox, Point, SqliteStore};

pub async fn run(
    store: &SqliteStore,
    lat: f64,
    lon: f64,
    distance: f64,
    pretty: bool,
) -> Result<()> {
    let bbox = BoundingBox::around(Point::new(lat, lon), distance);

    let response = supports_in(store, &bbox)
        .await
        .context("Failed to query supports")?;

    let output = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);

    Ok(())
}
