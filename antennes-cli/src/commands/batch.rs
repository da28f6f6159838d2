use anyhow::{Context, Result};
use antennes::{store::supports_in, BoundingBox, Point, SqliteStore};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Input column names.
pub struct Columns {
    pub lat: String,
    pub lon: String,
    pub distance: String,
}

pub async fn run(
    store: &SqliteStore,
    input: &Path,
    output: Option<PathBuf>,
    columns: &Columns,
    default_distance: f64,
) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = column_index(&headers, &columns.lat)?;
    let lon_idx = column_index(&headers, &columns.lon)?;
    let distance_idx = headers.iter().position(|h| h == columns.distance);

    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;
    let total = records.len() as u64;

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let output_path = output.unwrap_or_else(|| default_output(input));
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.extend(["supports", "antennas", "operators"]);
    writer.write_record(&new_headers)?;

    for (line, record) in records.iter().enumerate() {
        let lat = parse_field(record, lat_idx, "latitude", line)?;
        let lon = parse_field(record, lon_idx, "longitude", line)?;
        let distance = match distance_idx {
            Some(idx) => parse_field(record, idx, "distance", line)?,
            None => default_distance,
        };

        let bbox = BoundingBox::around(Point::new(lat, lon), distance);
        let response = supports_in(store, &bbox)
            .await
            .with_context(|| format!("Failed to query supports for record {}", line + 1))?;

        let supports = response.supports.len().to_string();
        let antennas = response.antenna_count().to_string();
        let operators = response.operator_count().to_string();

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.extend([supports.as_str(), antennas.as_str(), operators.as_str()]);
        writer.write_record(&new_record)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;

    println!("Output written to: {}", output_path.display());
    Ok(())
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("Column '{}' not found in CSV", name))
}

fn parse_field(record: &csv::StringRecord, idx: usize, what: &str, line: usize) -> Result<f64> {
    record
        .get(idx)
        .with_context(|| format!("Missing {} in record {}", what, line + 1))?
        .trim()
        .parse()
        .with_context(|| format!("Invalid {} in record {}", what, line + 1))
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "centers".to_string());
    input.with_file_name(format!("{}_supports.csv", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_name() {
        let path = default_output(Path::new("/tmp/centers.csv"));
        assert_eq!(path, PathBuf::from("/tmp/centers_supports.csv"));
    }

    #[test]
    fn test_parse_field() {
        let record = csv::StringRecord::from(vec!["48.8", " 2.3 ", "far"]);
        assert_eq!(parse_field(&record, 0, "latitude", 0).unwrap(), 48.8);
        assert_eq!(parse_field(&record, 1, "longitude", 0).unwrap(), 2.3);
        assert!(parse_field(&record, 2, "distance", 0).is_err());
        assert!(parse_field(&record, 3, "distance", 0).is_err());
    }
}
