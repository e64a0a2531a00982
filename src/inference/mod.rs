mod error;
mod hypothesis;
mod joint;
mod marginals;
mod tables;

pub use error::ModelError;
pub use hypothesis::{Hypothesis, HypothesisSpace};
pub use joint::{hypothesis_probability, joint_probability, transmit_prob};
pub use marginals::{Marginals, PersonMarginal};
pub use tables::{ProbabilityTables, GENE_STATES};

use crate::pedigree::Pedigree;
use std::ops::Range;
use std::time::Instant;

/// Enumeration cap. The trait mask fits a u64 with margin and anything past
/// this is far beyond practical exhaustive enumeration anyway.
pub const MAX_MEMBERS: usize = 20;

/// Builds the hypothesis space, rejecting pedigrees too large to enumerate.
pub fn hypothesis_space(pedigree: &Pedigree) -> Result<HypothesisSpace, ModelError> {
    if pedigree.len() > MAX_MEMBERS {
        return Err(ModelError::PedigreeTooLarge {
            count: pedigree.len(),
            max: MAX_MEMBERS,
        });
    }
    Ok(HypothesisSpace::new(pedigree))
}

/// Exact posterior gene and trait marginals for every member: enumerate,
/// score, accumulate, normalize. Single deterministic pass.
pub fn solve(pedigree: &Pedigree, tables: &ProbabilityTables) -> Result<Marginals, ModelError> {
    solve_with_deadline(pedigree, tables, None)
}

/// Like [`solve`], aborting with `DeadlineExceeded` once `deadline` passes.
/// The deadline is checked once per hypothesis, before scoring it.
pub fn solve_with_deadline(
    pedigree: &Pedigree,
    tables: &ProbabilityTables,
    deadline: Option<Instant>,
) -> Result<Marginals, ModelError> {
    let space = hypothesis_space(pedigree)?;
    let mut accumulator = Marginals::new(pedigree.len());
    let mut genes = Vec::new();
    for code in 0..space.gene_assignments() {
        space.decode_genes(code, &mut genes);
        for index in 0..space.trait_masks() {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(ModelError::DeadlineExceeded);
                }
            }
            let traits = space.trait_mask(index);
            let probability = joint_probability(pedigree, tables, &genes, traits);
            accumulator.record(&genes, traits, probability);
        }
    }
    accumulator.normalize()
}

/// Scores one chunk of gene assignment codes across every trait mask into a
/// partial, unnormalized table. Chunks over disjoint ranges merge additively,
/// which is what the parallel path in the infer command relies on.
pub fn score_gene_range(
    pedigree: &Pedigree,
    tables: &ProbabilityTables,
    space: &HypothesisSpace,
    codes: Range<u64>,
) -> Marginals {
    let mut partial = Marginals::new(pedigree.len());
    let mut genes = Vec::new();
    for code in codes {
        space.decode_genes(code, &mut genes);
        for index in 0..space.trait_masks() {
            let traits = space.trait_mask(index);
            let probability = joint_probability(pedigree, tables, &genes, traits);
            partial.record(&genes, traits, probability);
        }
    }
    partial
}
