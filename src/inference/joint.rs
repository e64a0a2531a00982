use super::{Hypothesis, ProbabilityTables};
use crate::pedigree::Pedigree;

/// Probability that a parent with `gene` copies transmits a variant allele,
/// accounting for mutation in transit. A heterozygous parent transmits each
/// allele with probability 0.5, so mutation cancels out analytically.
pub fn transmit_prob(tables: &ProbabilityTables, gene: u8) -> f64 {
    let mu = tables.mutation_rate();
    match gene {
        0 => mu,
        1 => 0.5 * (1.0 - mu) + 0.5 * mu,
        _ => 1.0 - mu,
    }
}

/// P(child carries `gene` copies | parent gene counts). The three cases over
/// `gene` sum to 1 for any pair of transmission probabilities.
fn child_gene_prob(tables: &ProbabilityTables, mother: u8, father: u8, gene: u8) -> f64 {
    let m = transmit_prob(tables, mother);
    let f = transmit_prob(tables, father);
    match gene {
        0 => (1.0 - m) * (1.0 - f),
        1 => m * (1.0 - f) + f * (1.0 - m),
        _ => m * f,
    }
}

/// Joint probability of one hypothesis: the product over members of
/// P(gene | parents' genes, or the founder prior) × P(trait | gene).
/// Each member's trait depends only on their own gene count and each gene
/// count only on the parents' counts, which licenses the product form.
pub fn joint_probability(
    pedigree: &Pedigree,
    tables: &ProbabilityTables,
    genes: &[u8],
    traits: u64,
) -> f64 {
    let mut probability = 1.0;
    for (ordinal, member) in pedigree.members().iter().enumerate() {
        let gene = genes[ordinal];
        let gene_prob = match member.parents {
            None => tables.prior(gene),
            Some((mother, father)) => {
                child_gene_prob(tables, genes[mother], genes[father], gene)
            }
        };
        let has_trait = traits >> ordinal & 1 == 1;
        probability *= gene_prob * tables.penetrance(gene, has_trait);
    }
    probability
}

pub fn hypothesis_probability(
    pedigree: &Pedigree,
    tables: &ProbabilityTables,
    hypothesis: &Hypothesis,
) -> f64 {
    joint_probability(pedigree, tables, &hypothesis.genes, hypothesis.traits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedigree::{record, Pedigree};

    const EPSILON: f64 = 1e-12;

    #[test]
    fn transmit_probs_with_default_rate() {
        let tables = ProbabilityTables::default();
        assert!((transmit_prob(&tables, 0) - 0.01).abs() < EPSILON);
        assert!((transmit_prob(&tables, 1) - 0.5).abs() < EPSILON);
        assert!((transmit_prob(&tables, 2) - 0.99).abs() < EPSILON);
    }

    #[test]
    fn one_copy_transmission_is_half_for_any_rate() {
        for rate in [0.0, 0.05, 0.2, 0.35, 0.5] {
            let tables =
                ProbabilityTables::from_penetrance([0.96, 0.03, 0.01], [0.01, 0.56, 0.65], rate)
                    .unwrap();
            assert!((transmit_prob(&tables, 1) - 0.5).abs() < EPSILON);
        }
    }

    #[test]
    fn transmission_converges_monotonically_to_half() {
        let rates = [0.05, 0.15, 0.25, 0.35, 0.45];
        let mut prev_two = 1.0;
        let mut prev_zero = 0.0;
        for rate in rates {
            let tables =
                ProbabilityTables::from_penetrance([0.96, 0.03, 0.01], [0.01, 0.56, 0.65], rate)
                    .unwrap();
            let two = transmit_prob(&tables, 2);
            let zero = transmit_prob(&tables, 0);
            assert!(two < prev_two && two >= 0.5);
            assert!(zero > prev_zero && zero <= 0.5);
            prev_two = two;
            prev_zero = zero;
        }
    }

    #[test]
    fn child_gene_probs_sum_to_one() {
        let tables = ProbabilityTables::default();
        for mother in 0..3u8 {
            for father in 0..3u8 {
                let total: f64 = (0..3u8)
                    .map(|g| child_gene_prob(&tables, mother, father, g))
                    .sum();
                assert!((total - 1.0).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn founder_factor_is_prior_times_penetrance() {
        let tables = ProbabilityTables::default();
        let pedigree = Pedigree::from_records(&[record("a", "", "", None)]).unwrap();
        let p = joint_probability(&pedigree, &tables, &[1], 0b1);
        assert!((p - 0.03 * 0.56).abs() < EPSILON);
        let p = joint_probability(&pedigree, &tables, &[0], 0b0);
        assert!((p - 0.96 * 0.99).abs() < EPSILON);
    }

    #[test]
    fn trio_hypothesis_matches_reference_value() {
        // Harry one copy, James two copies (trait), Lily zero copies.
        let tables = ProbabilityTables::default();
        let pedigree = Pedigree::from_records(&[
            record("Harry", "Lily", "James", None),
            record("James", "", "", Some(true)),
            record("Lily", "", "", Some(false)),
        ])
        .unwrap();
        let p = joint_probability(&pedigree, &tables, &[1, 2, 0], 0b010);
        assert!((p - 0.0026643247488).abs() < 1e-15);
        let hypothesis = Hypothesis {
            genes: vec![1, 2, 0],
            traits: 0b010,
        };
        assert_eq!(hypothesis_probability(&pedigree, &tables, &hypothesis), p);
    }

    #[test]
    fn empty_pedigree_has_unit_probability() {
        let tables = ProbabilityTables::default();
        let pedigree = Pedigree::from_records(&[]).unwrap();
        assert_eq!(joint_probability(&pedigree, &tables, &[], 0), 1.0);
    }
}
