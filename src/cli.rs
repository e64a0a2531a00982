use crate::inference::GENE_STATES;
use crate::utils::Result;
use chrono::Datelike;
use clap::{ArgAction, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| env!("CARGO_PKG_VERSION").to_string());

#[derive(Parser)]
#[command(name="mendel",
          version=&**FULL_VERSION,
          about="Exact Bayesian inference of gene and trait probabilities in pedigrees",
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) {}. Intended for research use only.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Compute posterior gene and trait distributions for a pedigree")]
    Infer(InferArgs),
    #[clap(about = "Check a pedigree file and probability tables without running inference")]
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct InferArgs {
    #[clap(required = true)]
    #[clap(short = 'p')]
    #[clap(long = "pedigree")]
    #[clap(help = "CSV file with pedigree records (columns: name, mother, father, trait)")]
    #[clap(value_name = "PEDIGREE")]
    #[arg(value_parser = check_file_exists)]
    pub pedigree_path: PathBuf,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Write the report to this file instead of stdout")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: Option<PathBuf>,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "mutation-rate")]
    #[clap(value_name = "RATE")]
    #[clap(help = "Probability that a transmitted allele flips state in transit")]
    #[clap(default_value = "0.01")]
    #[arg(value_parser = mutation_rate_in_range)]
    pub mutation_rate: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "gene-prior")]
    #[clap(value_name = "PRIOR")]
    #[clap(help = "Prior probabilities of carrying 0, 1 and 2 gene copies (comma-separated, sums to 1)")]
    #[clap(default_value = "0.96,0.03,0.01")]
    #[arg(value_parser = distribution_from_string)]
    pub gene_prior: [f64; GENE_STATES],

    #[clap(help_heading("Advanced"))]
    #[clap(long = "trait-probs")]
    #[clap(value_name = "PROBS")]
    #[clap(help = "Probability of expressing the trait given 0, 1 and 2 gene copies (comma-separated)")]
    #[clap(default_value = "0.01,0.56,0.65")]
    #[arg(value_parser = penetrance_from_string)]
    pub trait_probs: [f64; GENE_STATES],

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-time")]
    #[clap(value_name = "SECONDS")]
    #[clap(help = "Abort inference after this many seconds")]
    pub max_time: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct ValidateArgs {
    #[clap(required = true)]
    #[clap(short = 'p')]
    #[clap(long = "pedigree")]
    #[clap(help = "CSV file with pedigree records (columns: name, mother, father, trait)")]
    #[clap(value_name = "PEDIGREE")]
    #[arg(value_parser = check_file_exists)]
    pub pedigree_path: PathBuf,

    #[clap(long = "mutation-rate")]
    #[clap(value_name = "RATE")]
    #[clap(help = "Probability that a transmitted allele flips state in transit")]
    #[clap(default_value = "0.01")]
    #[arg(value_parser = mutation_rate_in_range)]
    pub mutation_rate: f64,

    #[clap(long = "gene-prior")]
    #[clap(value_name = "PRIOR")]
    #[clap(help = "Prior probabilities of carrying 0, 1 and 2 gene copies (comma-separated, sums to 1)")]
    #[clap(default_value = "0.96,0.03,0.01")]
    #[arg(value_parser = distribution_from_string)]
    pub gene_prior: [f64; GENE_STATES],

    #[clap(long = "trait-probs")]
    #[clap(value_name = "PROBS")]
    #[clap(help = "Probability of expressing the trait given 0, 1 and 2 gene copies (comma-separated)")]
    #[clap(default_value = "0.01,0.56,0.65")]
    #[arg(value_parser = penetrance_from_string)]
    pub trait_probs: [f64; GENE_STATES],
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn mutation_rate_in_range(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=0.5).contains(&value) {
        Err(format!(
            "The mutation rate must be between 0.0 and 0.5, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn parse_probs(s: &str) -> Result<[f64; GENE_STATES]> {
    let values: Vec<f64> = s.split(',').filter_map(|x| x.parse().ok()).collect();
    if values.len() != GENE_STATES {
        return Err(format!(
            "Expected {} comma-separated probabilities. Got {} -> {}",
            GENE_STATES,
            values.len(),
            s
        ));
    }
    if values.iter().any(|&val| !(0.0..=1.0).contains(&val)) {
        return Err(format!(
            "Probabilities must be between 0.0 and 1.0. Got {}.",
            s
        ));
    }
    Ok([values[0], values[1], values[2]])
}

fn distribution_from_string(s: &str) -> Result<[f64; GENE_STATES]> {
    let values = parse_probs(s)?;
    let total: f64 = values.iter().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(format!("Probabilities must sum to 1. Got {} -> {}", s, total));
    }
    Ok(values)
}

fn penetrance_from_string(s: &str) -> Result<[f64; GENE_STATES]> {
    parse_probs(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_prior() {
        assert_eq!(
            distribution_from_string("0.96,0.03,0.01").unwrap(),
            [0.96, 0.03, 0.01]
        );
    }

    #[test]
    fn rejects_prior_off_by_sum() {
        assert!(distribution_from_string("0.5,0.3,0.1").is_err());
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!(penetrance_from_string("0.1,0.2").is_err());
        assert!(penetrance_from_string("0.1,0.2,0.3,0.4").is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(penetrance_from_string("0.1,1.2,0.3").is_err());
        assert!(mutation_rate_in_range("0.7").is_err());
        assert!(mutation_rate_in_range("0.25").is_ok());
    }
}
