use super::{ModelError, GENE_STATES};

/// One member's accumulated probability mass: three gene bins and two trait
/// bins (`[false, true]`). Raw joint mass until `Marginals::normalize`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersonMarginal {
    pub gene: [f64; GENE_STATES],
    pub phenotype: [f64; 2],
}

impl PersonMarginal {
    pub fn gene_prob(&self, gene: u8) -> f64 {
        self.gene[gene as usize]
    }

    pub fn trait_prob(&self, has_trait: bool) -> f64 {
        self.phenotype[has_trait as usize]
    }
}

/// Per-member marginal table, indexed by ordinal. Accumulation is plain
/// addition, so partial tables built on different workers merge elementwise
/// in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct Marginals {
    bins: Vec<PersonMarginal>,
}

impl Marginals {
    pub fn new(member_count: usize) -> Self {
        Marginals {
            bins: vec![PersonMarginal::default(); member_count],
        }
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn person(&self, ordinal: usize) -> &PersonMarginal {
        &self.bins[ordinal]
    }

    /// Folds one scored hypothesis into every member's bins.
    pub fn record(&mut self, genes: &[u8], traits: u64, probability: f64) {
        for (ordinal, bins) in self.bins.iter_mut().enumerate() {
            bins.gene[genes[ordinal] as usize] += probability;
            bins.phenotype[(traits >> ordinal & 1) as usize] += probability;
        }
    }

    /// Elementwise addition of a partial table built over a disjoint chunk
    /// of the hypothesis space.
    pub fn merge(&mut self, other: &Marginals) {
        assert_eq!(self.bins.len(), other.bins.len());
        for (mine, theirs) in self.bins.iter_mut().zip(&other.bins) {
            for (a, b) in mine.gene.iter_mut().zip(&theirs.gene) {
                *a += b;
            }
            for (a, b) in mine.phenotype.iter_mut().zip(&theirs.phenotype) {
                *a += b;
            }
        }
    }

    /// Total accumulated mass, which before normalization equals the
    /// probability of the evidence and is shared by every member and both
    /// variables. Taken from member 0's gene bins; `None` for an empty table.
    pub fn total_mass(&self) -> Option<f64> {
        self.bins.first().map(|b| b.gene.iter().sum())
    }

    /// Rescales every member's gene bins and trait bins to sum to 1,
    /// converting raw mass into posteriors conditioned on the evidence.
    /// A zero or non-finite denominator means no hypothesis carried mass.
    pub fn normalize(mut self) -> Result<Marginals, ModelError> {
        for bins in &mut self.bins {
            scale_to_unit(&mut bins.gene)?;
            scale_to_unit(&mut bins.phenotype)?;
        }
        Ok(self)
    }
}

fn scale_to_unit(bins: &mut [f64]) -> Result<(), ModelError> {
    let total: f64 = bins.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(ModelError::EvidenceUnsatisfiable);
    }
    for bin in bins.iter_mut() {
        *bin /= total;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn record_routes_mass_to_the_assigned_bins() {
        let mut marginals = Marginals::new(2);
        marginals.record(&[1, 2], 0b01, 0.25);
        assert_eq!(marginals.person(0).gene_prob(1), 0.25);
        assert_eq!(marginals.person(0).trait_prob(true), 0.25);
        assert_eq!(marginals.person(1).gene_prob(2), 0.25);
        assert_eq!(marginals.person(1).trait_prob(false), 0.25);
        assert_eq!(marginals.person(1).trait_prob(true), 0.0);
    }

    #[test]
    fn merge_equals_recording_everything_in_one_table() {
        let assignments: [(&[u8], u64, f64); 4] = [
            (&[0, 1], 0b00, 0.1),
            (&[2, 2], 0b11, 0.2),
            (&[1, 0], 0b10, 0.3),
            (&[0, 0], 0b01, 0.4),
        ];
        let mut whole = Marginals::new(2);
        for (genes, traits, p) in assignments {
            whole.record(genes, traits, p);
        }
        let mut left = Marginals::new(2);
        let mut right = Marginals::new(2);
        for (genes, traits, p) in &assignments[..2] {
            left.record(genes, *traits, *p);
        }
        for (genes, traits, p) in &assignments[2..] {
            right.record(genes, *traits, *p);
        }
        // Merge order must not matter.
        let mut ab = left.clone();
        ab.merge(&right);
        let mut ba = right.clone();
        ba.merge(&left);
        assert_eq!(ab, whole);
        assert_eq!(ba, whole);
    }

    #[test]
    fn total_mass_is_shared_across_members_and_variables() {
        let mut marginals = Marginals::new(3);
        marginals.record(&[0, 1, 2], 0b101, 0.5);
        marginals.record(&[2, 2, 0], 0b010, 0.25);
        let total = marginals.total_mass().unwrap();
        assert!((total - 0.75).abs() < EPSILON);
        for ordinal in 0..3 {
            let person = marginals.person(ordinal);
            assert!((person.gene.iter().sum::<f64>() - total).abs() < EPSILON);
            assert!((person.phenotype.iter().sum::<f64>() - total).abs() < EPSILON);
        }
    }

    #[test]
    fn normalize_produces_unit_sums() {
        let mut marginals = Marginals::new(1);
        marginals.record(&[0], 0b0, 0.2);
        marginals.record(&[1], 0b1, 0.6);
        let posterior = marginals.normalize().unwrap();
        let person = posterior.person(0);
        assert!((person.gene.iter().sum::<f64>() - 1.0).abs() < EPSILON);
        assert!((person.phenotype.iter().sum::<f64>() - 1.0).abs() < EPSILON);
        assert!((person.gene_prob(1) - 0.75).abs() < EPSILON);
        assert!((person.trait_prob(true) - 0.75).abs() < EPSILON);
    }

    #[test]
    fn normalize_rejects_zero_mass() {
        let marginals = Marginals::new(1);
        assert_eq!(
            marginals.normalize().unwrap_err(),
            ModelError::EvidenceUnsatisfiable
        );
    }

    #[test]
    fn empty_table_normalizes_trivially() {
        let marginals = Marginals::new(0);
        let posterior = marginals.normalize().unwrap();
        assert!(posterior.is_empty());
        assert_eq!(posterior.total_mass(), None);
    }
}
