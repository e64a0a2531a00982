use crate::pedigree::Pedigree;
use itertools::Itertools;

/// One complete assignment of gene count and trait to every member.
/// `genes[i]` is member i's copy count; bit i of `traits` is set when
/// member i has the trait. Evidence consistency holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    pub genes: Vec<u8>,
    pub traits: u64,
}

impl Hypothesis {
    pub fn gene(&self, ordinal: usize) -> u8 {
        self.genes[ordinal]
    }

    pub fn has_trait(&self, ordinal: usize) -> bool {
        self.traits >> ordinal & 1 == 1
    }
}

/// The finite space of evidence-consistent hypotheses for one pedigree:
/// the Cartesian product of all 3^n base-3 gene assignments (gene count is
/// never observed, so no pruning applies) and the 2^u trait masks obtained
/// by scattering free bits into the positions of members with unknown
/// phenotype. Iteration is lazy and restartable.
#[derive(Debug, Clone)]
pub struct HypothesisSpace {
    member_count: usize,
    fixed_traits: u64,
    free_positions: Vec<usize>,
}

impl HypothesisSpace {
    pub fn new(pedigree: &Pedigree) -> Self {
        let mut fixed_traits = 0u64;
        let mut free_positions = Vec::new();
        for (ordinal, member) in pedigree.members().iter().enumerate() {
            match member.phenotype {
                Some(true) => fixed_traits |= 1 << ordinal,
                Some(false) => {}
                None => free_positions.push(ordinal),
            }
        }
        HypothesisSpace {
            member_count: pedigree.len(),
            fixed_traits,
            free_positions,
        }
    }

    /// Number of gene assignments, 3^n.
    pub fn gene_assignments(&self) -> u64 {
        3u64.pow(self.member_count as u32)
    }

    /// Number of evidence-consistent trait masks, 2^u.
    pub fn trait_masks(&self) -> u64 {
        1 << self.free_positions.len()
    }

    pub fn hypothesis_count(&self) -> u64 {
        self.gene_assignments() * self.trait_masks()
    }

    /// Decodes gene assignment `code` (base 3, member 0 in the least
    /// significant digit) into `genes`, which is resized to fit.
    pub fn decode_genes(&self, code: u64, genes: &mut Vec<u8>) {
        genes.clear();
        genes.resize(self.member_count, 0);
        let mut rest = code;
        for gene in genes.iter_mut() {
            *gene = (rest % 3) as u8;
            rest /= 3;
        }
    }

    /// Builds the k-th evidence-consistent trait mask by scattering the bits
    /// of `index` into the unknown members' positions.
    pub fn trait_mask(&self, index: u64) -> u64 {
        let mut mask = self.fixed_traits;
        for (bit, &position) in self.free_positions.iter().enumerate() {
            if index >> bit & 1 == 1 {
                mask |= 1 << position;
            }
        }
        mask
    }

    /// A fresh pass over every hypothesis; call again to restart.
    pub fn iter(&self) -> impl Iterator<Item = Hypothesis> + '_ {
        (0..self.gene_assignments())
            .cartesian_product(0..self.trait_masks())
            .map(|(code, index)| {
                let mut genes = Vec::new();
                self.decode_genes(code, &mut genes);
                Hypothesis {
                    genes,
                    traits: self.trait_mask(index),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedigree::{record, Pedigree};

    fn trio() -> Pedigree {
        Pedigree::from_records(&[
            record("Harry", "Lily", "James", None),
            record("James", "", "", Some(true)),
            record("Lily", "", "", Some(false)),
        ])
        .unwrap()
    }

    #[test]
    fn counts_match_the_combinatorics() {
        let space = HypothesisSpace::new(&trio());
        assert_eq!(space.gene_assignments(), 27);
        assert_eq!(space.trait_masks(), 2);
        assert_eq!(space.hypothesis_count(), 54);
        assert_eq!(space.iter().count(), 54);
    }

    #[test]
    fn masks_respect_evidence() {
        let space = HypothesisSpace::new(&trio());
        for index in 0..space.trait_masks() {
            let mask = space.trait_mask(index);
            assert_eq!(mask >> 1 & 1, 1, "James observed true");
            assert_eq!(mask >> 2 & 1, 0, "Lily observed false");
        }
        // Harry's bit is the only one that varies.
        let masks: Vec<u64> = (0..space.trait_masks()).map(|i| space.trait_mask(i)).collect();
        assert_eq!(masks, vec![0b010, 0b011]);
    }

    #[test]
    fn gene_codes_cover_all_assignments() {
        let space = HypothesisSpace::new(&trio());
        let mut seen = std::collections::HashSet::new();
        let mut genes = Vec::new();
        for code in 0..space.gene_assignments() {
            space.decode_genes(code, &mut genes);
            assert!(genes.iter().all(|&g| g <= 2));
            assert!(seen.insert(genes.clone()));
        }
        assert_eq!(seen.len(), 27);
    }

    #[test]
    fn iteration_is_restartable() {
        let space = HypothesisSpace::new(&trio());
        let first: Vec<Hypothesis> = space.iter().collect();
        let second: Vec<Hypothesis> = space.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_pedigree_yields_one_empty_hypothesis() {
        let pedigree = Pedigree::from_records(&[]).unwrap();
        let space = HypothesisSpace::new(&pedigree);
        let all: Vec<Hypothesis> = space.iter().collect();
        assert_eq!(all.len(), 1);
        assert!(all[0].genes.is_empty());
        assert_eq!(all[0].traits, 0);
    }

    #[test]
    fn hypothesis_accessors() {
        let hyp = Hypothesis {
            genes: vec![1, 2, 0],
            traits: 0b011,
        };
        assert_eq!(hyp.gene(1), 2);
        assert!(hyp.has_trait(0));
        assert!(!hyp.has_trait(2));
    }
}
