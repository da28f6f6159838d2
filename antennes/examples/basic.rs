//! Basic example: list the supports around a point.
//!
//! Run with: cargo run --example basic -- /path/to/quelle-antenne.sqlite3

use antennes::store::{supports_in, StoreBuilder};
use antennes::{BoundingBox, Error, Point};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let db_path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/quelle-antenne.sqlite3");
        std::process::exit(1);
    });

    let store = StoreBuilder::new(&db_path).build().await?;

    // Notre-Dame de Paris, 1 km around
    let center = Point::new(48.8530, 2.3499);
    let bbox = BoundingBox::around(center, 1.0);

    println!(
        "Bounding box: ({:.5}, {:.5}) ({:.5}, {:.5})",
        bbox.max_lat, bbox.min_lon, bbox.min_lat, bbox.max_lon
    );
    println!("{:-<50}", "");

    let response = supports_in(&store, &bbox).await?;
    for support in &response.supports {
        println!("Support {} ({:.5}, {:.5})", support.support_id, support.lat, support.lon);
        for group in &support.height_groups {
            for antenna in &group.antennas {
                let azimuth = if antenna.azimuth.is_omnidirectional() {
                    "omni".to_string()
                } else {
                    format!("{}°", antenna.azimuth.to_raw())
                };
                println!(
                    "  {:>6.1} m  antenna {:<10} {:<8} {}",
                    group.height,
                    antenna.antenna_id,
                    azimuth,
                    antenna.operators.join(", ")
                );
            }
        }
    }

    println!("{:-<50}", "");
    println!(
        "{} supports, {} antennas",
        response.supports.len(),
        response.antenna_count()
    );

    Ok(())
}
