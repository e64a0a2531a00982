use super::ModelError;

/// Number of gene copy states (0, 1 or 2 copies of the variant allele).
pub const GENE_STATES: usize = 3;

const DEFAULT_PRIOR: [f64; GENE_STATES] = [0.96, 0.03, 0.01];
const DEFAULT_PENETRANCE: [f64; GENE_STATES] = [0.01, 0.56, 0.65];
const DEFAULT_MUTATION_RATE: f64 = 0.01;

const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Immutable probability model shared by all inference runs: the founder
/// gene-count prior, the trait-given-gene table and the mutation rate.
/// Validated on construction so inference never sees a malformed table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTables {
    prior: [f64; GENE_STATES],
    trait_given_gene: [[f64; 2]; GENE_STATES],
    mutation_rate: f64,
}

impl ProbabilityTables {
    /// `trait_given_gene` rows are `[P(no trait | g), P(trait | g)]`.
    pub fn new(
        prior: [f64; GENE_STATES],
        trait_given_gene: [[f64; 2]; GENE_STATES],
        mutation_rate: f64,
    ) -> Result<Self, ModelError> {
        check_distribution("gene prior", &prior)?;
        for (gene, row) in trait_given_gene.iter().enumerate() {
            check_distribution(&format!("trait row for {} copies", gene), row)?;
        }
        if !(0.0..=0.5).contains(&mutation_rate) {
            return Err(ModelError::InvalidTables(format!(
                "mutation rate must be in [0, 0.5], got {}",
                mutation_rate
            )));
        }
        Ok(ProbabilityTables {
            prior,
            trait_given_gene,
            mutation_rate,
        })
    }

    /// Build tables from `P(trait | g)` alone; the no-trait column is the
    /// complement, so the rows sum to 1 by construction.
    pub fn from_penetrance(
        prior: [f64; GENE_STATES],
        penetrance: [f64; GENE_STATES],
        mutation_rate: f64,
    ) -> Result<Self, ModelError> {
        for (gene, &p) in penetrance.iter().enumerate() {
            if !(0.0..=1.0).contains(&p) || !p.is_finite() {
                return Err(ModelError::InvalidTables(format!(
                    "trait probability for {} copies must be in [0, 1], got {}",
                    gene, p
                )));
            }
        }
        let trait_given_gene = [
            [1.0 - penetrance[0], penetrance[0]],
            [1.0 - penetrance[1], penetrance[1]],
            [1.0 - penetrance[2], penetrance[2]],
        ];
        Self::new(prior, trait_given_gene, mutation_rate)
    }

    pub fn prior(&self, gene: u8) -> f64 {
        self.prior[gene as usize]
    }

    pub fn penetrance(&self, gene: u8, has_trait: bool) -> f64 {
        self.trait_given_gene[gene as usize][has_trait as usize]
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }
}

impl Default for ProbabilityTables {
    fn default() -> Self {
        ProbabilityTables {
            prior: DEFAULT_PRIOR,
            trait_given_gene: [
                [1.0 - DEFAULT_PENETRANCE[0], DEFAULT_PENETRANCE[0]],
                [1.0 - DEFAULT_PENETRANCE[1], DEFAULT_PENETRANCE[1]],
                [1.0 - DEFAULT_PENETRANCE[2], DEFAULT_PENETRANCE[2]],
            ],
            mutation_rate: DEFAULT_MUTATION_RATE,
        }
    }
}

fn check_distribution(what: &str, values: &[f64]) -> Result<(), ModelError> {
    if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(ModelError::InvalidTables(format!(
            "{} contains a negative or non-finite value",
            what
        )));
    }
    let total: f64 = values.iter().sum();
    if (total - 1.0).abs() > ROW_SUM_TOLERANCE {
        return Err(ModelError::InvalidTables(format!(
            "{} sums to {}, expected 1",
            what, total
        )));
    }
    Ok(())
}
