use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const CATALOG: &str = "tests/fixtures/catalog.json";

const COUNTRIES: [&str; 6] = ["FRA", "MCO", "DEU", "AUT", "ESP", "USA"];

pub fn generate_requests_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = rand::thread_rng();

    wtr.write_record(["country", "weight", "locale", "tax_rule", "declared_value"])?;

    for _ in 0..rows {
        let country = COUNTRIES[rng.gen_range(0..COUNTRIES.len())];
        let grams: u32 = rng.gen_range(0..40_000);
        let weight = format!("{}.{:03}", grams / 1000, grams % 1000);
        wtr.write_record([country, weight.as_str(), "fr_FR", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}
