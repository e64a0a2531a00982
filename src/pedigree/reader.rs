use super::{Pedigree, PedigreeRecord};
use crate::utils::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read as ioRead};
use std::path::Path;

/// Opens a pedigree file, transparently decoding gzip when the extension
/// says so.
pub fn open_pedigree_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.display()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

/// Reads raw records from delimited text with a `name,mother,father,trait`
/// header. An empty mother/father marks a founder; trait "1" means observed
/// true, "0" observed false, anything else unknown.
pub fn read_records<R: ioRead>(reader: R) -> Result<Vec<PedigreeRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| format!("Failed to read header: {}", e))?
        .clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(format!("Missing column '{}' in header", name))
    };
    let name_col = column("name")?;
    let mother_col = column("mother")?;
    let father_col = column("father")?;
    let trait_col = column("trait")?;

    let mut records = Vec::new();
    for (line_number, row) in csv_reader.records().enumerate() {
        let row = row.map_err(|e| format!("Record {}: {}", line_number + 1, e))?;
        let field = |col: usize| row.get(col).unwrap_or("");
        let optional = |col: usize| {
            let value = field(col);
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };
        records.push(PedigreeRecord {
            name: field(name_col).to_string(),
            mother: optional(mother_col),
            father: optional(father_col),
            phenotype: match field(trait_col) {
                "1" => Some(true),
                "0" => Some(false),
                _ => None,
            },
        });
    }
    Ok(records)
}

pub fn load_pedigree(path: &Path) -> Result<Pedigree> {
    let reader = open_pedigree_reader(path)?;
    let records = read_records(reader)?;
    Pedigree::from_records(&records).map_err(|e| e.to_string())
}
