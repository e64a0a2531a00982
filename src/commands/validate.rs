use crate::cli::ValidateArgs;
use crate::inference::{hypothesis_space, ProbabilityTables};
use crate::pedigree::{open_pedigree_reader, read_records, Pedigree};
use crate::utils::Result;

pub fn validate(args: ValidateArgs) -> Result<()> {
    ProbabilityTables::from_penetrance(args.gene_prior, args.trait_probs, args.mutation_rate)
        .map_err(|e| e.to_string())?;
    log::info!("Probability tables pass");

    let reader = open_pedigree_reader(&args.pedigree_path)?;
    let records = read_records(reader)?;
    log::info!("Parsed {} records", records.len());

    let pedigree = match Pedigree::from_records(&records) {
        Ok(pedigree) => pedigree,
        Err(e) => {
            log::error!("{}", e);
            return Err("Validation failed".to_string());
        }
    };

    log::info!(
        "Members={}, founders={}, observed traits={}",
        pedigree.len(),
        pedigree.founder_count(),
        pedigree.evidence_count()
    );

    match hypothesis_space(&pedigree) {
        Ok(space) => log::info!(
            "Validation successful. Hypotheses to enumerate={}",
            space.hypothesis_count()
        ),
        Err(e) => {
            log::error!("{}", e);
            return Err("Validation failed".to_string());
        }
    }

    Ok(())
}
