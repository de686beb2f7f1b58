use std::path::PathBuf;

use argh::FromArgs;
use samo::{
    align::{metrics, AlignConfig, AlignmentResult, MultiAlign, PairAlign, PointSequence},
    io::{read_chain_file, read_solution, write_solution},
};

/// Rigid superposition and residue correspondence of protein backbones
#[derive(Debug, FromArgs)]
struct Args {
    /// chain files, two for a pairwise alignment and more for a multiple alignment
    #[argh(positional)]
    chains: Vec<PathBuf>,

    /// JSON file with the alignment parameters, command line values take precedence
    #[argh(option)]
    config: Option<PathBuf>,

    /// balance between aligned length and RMSD, smaller values give smaller RMSD
    #[argh(option, short = 'l')]
    lambda: Option<f64>,

    /// use branch and bound instead of the iterative method
    #[argh(switch, short = 'b')]
    branch_and_bound: bool,

    /// require an alignment in sequential order
    #[argh(switch)]
    sequential_order: bool,

    /// heuristic level for finding initial solutions [default: 2]
    #[argh(option)]
    heuristic_start: Option<usize>,

    /// enable the annealing continuation
    #[argh(switch)]
    annealing: bool,

    /// initial threshold relaxation for annealing [default: 60]
    #[argh(option)]
    annealing_initial: Option<f64>,

    /// cooling coefficient for annealing [default: 0.4]
    #[argh(option)]
    annealing_rate: Option<f64>,

    /// evaluate the alignment stored in a solution file
    #[argh(option)]
    evaluate: Option<PathBuf>,

    /// improve the alignment stored in a solution file
    #[argh(option)]
    improve: Option<PathBuf>,

    /// write the pairwise alignment to a solution file
    #[argh(option)]
    output_solution: Option<PathBuf>,

    /// consensus refinement rounds of a multiple alignment [default: 5]
    #[argh(option)]
    rounds: Option<usize>,

    /// print the effective parameters as JSON
    #[argh(switch)]
    print_config: bool,

    /// log level, 0 off, 1 error, 2 warning, 3 info, 4 debug, 5 trace
    #[argh(option, short = 'v', default = "3")]
    verbosity: u8,
}

fn level_filter(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn build_config(args: &Args) -> Result<AlignConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AlignConfig::from_json_file(path)?,
        None => AlignConfig::default(),
    };

    if let Some(lambda) = args.lambda {
        config.lambda = lambda;
    }
    if let Some(level) = args.heuristic_start {
        config.heuristic_start_level = level;
    }
    if let Some(initial) = args.annealing_initial {
        config.annealing_initial = initial;
    }
    if let Some(rate) = args.annealing_rate {
        config.annealing_rate = rate;
    }
    config.use_branch_and_bound |= args.branch_and_bound;
    config.enforce_sequential_order |= args.sequential_order;
    config.annealing_enabled |= args.annealing;

    config.validate()?;
    Ok(config)
}

fn print_pair(a: &PointSequence, b: &PointSequence, result: &AlignmentResult) {
    println!("{} (size={}) vs {} (size={})", a.name(), a.len(), b.name(), b.len());
    println!(
        "Aligned = {}, RMSD = {:.6}, Break/Permutation = {}/{}, SeqId = {:5.3}",
        result.aligned_count,
        result.rmsd,
        result.break_count,
        result.permutation_count,
        result.sequence_identity
    );
    if a.has_residues() && b.has_residues() {
        let (top, bottom) = metrics::aligned_sequences(a, b, &result.correspondence);
        println!("{}\n{}", top, bottom);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    env_logger::Builder::new()
        .filter_level(level_filter(args.verbosity))
        .parse_default_env()
        .init();

    let config = build_config(&args)?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    let chains = args
        .chains
        .iter()
        .map(read_chain_file)
        .collect::<Result<Vec<_>, _>>()?;
    for chain in &chains {
        log::info!("Length of the protein chain {} is {}", chain.name(), chain.len());
    }

    let stored = match (&args.evaluate, &args.improve) {
        (Some(_), Some(_)) => return Err("--evaluate and --improve are exclusive".into()),
        (Some(path), None) | (None, Some(path)) => Some(read_solution(path)?),
        (None, None) => None,
    };

    match chains.as_slice() {
        [a, b] => {
            let pair = PairAlign::new(a, b, config);
            let result = match &stored {
                Some(solution) if args.evaluate.is_some() => pair.evaluate(solution)?,
                Some(solution) => pair.improve(solution)?,
                None => pair.solve()?,
            };
            let result = pair.post_process(result);
            print_pair(a, b, &result);

            if let Some(path) = &args.output_solution {
                write_solution(path, &result, a.name(), b.name())?;
                log::info!("Solution written to {}", path.display());
            }
        }
        _ if stored.is_some() => {
            return Err("2 protein chains are required for evaluation and improvement".into());
        }
        [_, _, ..] => {
            let rounds = args.rounds.unwrap_or(MultiAlign::DEFAULT_ROUNDS);
            let multi = MultiAlign::new(&chains, config).with_rounds(rounds).align()?;
            for (chain, result) in chains.iter().zip(&multi.results) {
                print_pair(chain, &multi.consensus, result);
            }
            println!(
                "Multiple Aligned: {:.1}, RMSD: {:.6}",
                multi.mean_aligned, multi.mean_rmsd
            );
        }
        _ => return Err("At least 2 protein chains are required for alignment".into()),
    }

    Ok(())
}
