use crate::utils::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Report destination: a buffered file when a path is given, stdout
/// otherwise.
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
