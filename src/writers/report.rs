use crate::inference::Marginals;
use crate::pedigree::Pedigree;
use crate::utils::Result;
use std::io::Write;

/// Writes per-individual posterior distributions in file order: gene bins
/// from two copies down to zero, then the trait bins.
pub struct ReportWriter {
    out: Box<dyn Write>,
}

impl ReportWriter {
    pub fn new(out: Box<dyn Write>) -> Self {
        ReportWriter { out }
    }

    pub fn write(&mut self, pedigree: &Pedigree, posterior: &Marginals) -> Result<()> {
        for (ordinal, member) in pedigree.members().iter().enumerate() {
            let person = posterior.person(ordinal);
            writeln!(self.out, "{}:", member.name).map_err(|e| e.to_string())?;
            writeln!(self.out, "  Gene:").map_err(|e| e.to_string())?;
            for gene in (0..3u8).rev() {
                writeln!(self.out, "    {}: {:.4}", gene, person.gene_prob(gene))
                    .map_err(|e| e.to_string())?;
            }
            writeln!(self.out, "  Trait:").map_err(|e| e.to_string())?;
            writeln!(self.out, "    True: {:.4}", person.trait_prob(true))
                .map_err(|e| e.to_string())?;
            writeln!(self.out, "    False: {:.4}", person.trait_prob(false))
                .map_err(|e| e.to_string())?;
        }
        self.out.flush().map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{solve, ProbabilityTables};
    use crate::pedigree::record;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn formats_single_founder_report() {
        let pedigree = Pedigree::from_records(&[record("a", "", "", None)]).unwrap();
        let posterior = solve(&pedigree, &ProbabilityTables::default()).unwrap();
        let buffer = SharedBuffer::default();
        let mut writer = ReportWriter::new(Box::new(buffer.clone()));
        writer.write(&pedigree, &posterior).unwrap();
        let text = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let expected = "a:\n  Gene:\n    2: 0.0100\n    1: 0.0300\n    0: 0.9600\n  Trait:\n    True: 0.0329\n    False: 0.9671\n";
        assert_eq!(text, expected);
    }
}
