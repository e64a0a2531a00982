use crate::cli::InferArgs;
use crate::inference::{
    self, hypothesis_space, score_gene_range, Marginals, ProbabilityTables,
};
use crate::pedigree::{load_pedigree, Pedigree};
use crate::utils::{create_output, Result};
use crate::writers::ReportWriter;
use crossbeam_channel::bounded;
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::ops::Range;
use std::thread;
use std::time::{Duration, Instant};

const CHANNEL_BUFFER_SIZE: usize = 128;

/// Gene-assignment codes scored per work unit. Each chunk also spans every
/// evidence-consistent trait mask, so units stay coarse enough to amortize
/// channel traffic.
const CHUNK_SIZE: u64 = 4096;

pub fn infer(args: InferArgs) -> Result<()> {
    let pedigree = load_pedigree(&args.pedigree_path)?;
    let tables =
        ProbabilityTables::from_penetrance(args.gene_prior, args.trait_probs, args.mutation_rate)
            .map_err(|e| e.to_string())?;

    log::info!(
        "{}: {} members, {} founders, {} with observed trait",
        args.pedigree_path.display(),
        pedigree.len(),
        pedigree.founder_count(),
        pedigree.evidence_count()
    );

    let start = Instant::now();
    let posterior = if args.num_threads > 1 {
        if args.max_time.is_some() {
            log::warn!("--max-time applies to single-threaded runs only, ignoring");
        }
        solve_parallel(&pedigree, &tables, args.num_threads)?
    } else {
        let deadline = args
            .max_time
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        inference::solve_with_deadline(&pedigree, &tables, deadline).map_err(|e| e.to_string())?
    };
    log::debug!("Inference finished in {:.2?}", start.elapsed());

    let out = create_output(args.output_path.as_deref())?;
    let mut writer = ReportWriter::new(out);
    writer.write(&pedigree, &posterior)
}

/// Parallel scoring: a producer thread streams gene-code chunks into a
/// bounded channel, pool workers score each chunk into a partial table and
/// a collector thread merges the partials. Merging is commutative, so the
/// nondeterministic arrival order does not affect the result beyond
/// floating-point rounding.
pub fn solve_parallel(
    pedigree: &Pedigree,
    tables: &ProbabilityTables,
    num_threads: usize,
) -> Result<Marginals> {
    let space = hypothesis_space(pedigree).map_err(|e| e.to_string())?;
    let total_codes = space.gene_assignments();
    log::debug!(
        "Scoring {} hypotheses across {} threads",
        space.hypothesis_count(),
        num_threads
    );

    let (sender_chunk, receiver_chunk) = bounded::<Range<u64>>(CHANNEL_BUFFER_SIZE);
    let chunk_stream_thread = thread::spawn(move || {
        let mut start = 0u64;
        while start < total_codes {
            let end = (start + CHUNK_SIZE).min(total_codes);
            if sender_chunk.send(start..end).is_err() {
                break;
            }
            start = end;
        }
    });

    let member_count = pedigree.len();
    let (sender_partial, receiver_partial) = bounded::<Marginals>(CHANNEL_BUFFER_SIZE);
    let collector_thread = thread::spawn(move || {
        let mut merged = Marginals::new(member_count);
        for partial in &receiver_partial {
            merged.merge(&partial);
        }
        merged
    });

    let pool = initialize_thread_pool(num_threads)?;
    pool.install(|| {
        receiver_chunk
            .into_iter()
            .par_bridge()
            .for_each_with(&sender_partial, |s, codes| {
                let partial = score_gene_range(pedigree, tables, &space, codes);
                if let Err(e) = s.send(partial) {
                    log::error!("Failed to send partial marginals to collector: {}", e);
                }
            });
    });

    drop(sender_partial);
    let merged = collector_thread.join().expect("Collector thread panicked");
    log::trace!("Collector thread finished");
    chunk_stream_thread
        .join()
        .expect("Chunk stream thread panicked");
    log::trace!("Chunk stream thread finished");

    merged.normalize().map_err(|e| e.to_string())
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("mendel-{}", i))
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
