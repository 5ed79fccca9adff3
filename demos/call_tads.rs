use std::env;
use std::fs::File;
use std::io::BufRead as _;
use std::io::BufReader;

use clustertad::Caller;
use clustertad::ContactMatrix;
use clustertad::genomic::Region;
use flate2::read::GzDecoder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let src = env::args().nth(1).expect("missing src");
    let region = env::args().nth(2).map(|s| s.parse::<Region>()).transpose()?;

    let reader = File::open(src).map(GzDecoder::new).map(BufReader::new)?;

    let mut rows = Vec::new();

    for result in reader.lines() {
        let line = result?;

        if line.trim().is_empty() {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|value| value.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(row);
    }

    let mut matrix = ContactMatrix::try_from_rows(rows)?;
    let boundaries = Caller::new().detect_boundaries(&mut matrix)?;

    match region {
        Some(region) => {
            for domain in region.domains(&boundaries, 10_000)? {
                println!("{domain}");
            }
        }
        None => {
            for (start, end) in boundaries.domains() {
                println!("{start}\t{end}");
            }
        }
    }

    Ok(())
}
