use anyhow::Result;
use antennes::{BoundingBox, Point};
use serde::Serialize;

#[derive(Serialize)]
struct BboxResponse {
    center: Point,
    distance_km: f64,
    upper_left: Point,
    bottom_right: Point,
}

pub fn run(lat: f64, lon: f64, distance: f64, json: bool) -> Result<()> {
    let center = Point::new(lat, lon);
    let bbox = BoundingBox::around(center, distance);

    if json {
        let response = BboxResponse {
            center,
            distance_km: distance,
            upper_left: bbox.upper_left(),
            bottom_right: bbox.bottom_right(),
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        let ul = bbox.upper_left();
        let br = bbox.bottom_right();
        println!("upper-left:   {:.6}, {:.6}", ul.lat, ul.lon);
        println!("bottom-right: {:.6}, {:.6}", br.lat, br.lon);
    }

    Ok(())
}
