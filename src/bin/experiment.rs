//! Command line tool to evaluate a model over cross-validation folds and summarize the results

use anyhow::anyhow;
use multilabel_cv::{
    cli::{ConfigOverrides, RunMode},
    experiment::{config::CONFIG_FILE, Experiment},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: experiment MODE [OPTIONS]

Arguments:
  MODE                 What to do ('run' or 'summarize')

Options:
  -h, --help           Print help
  -c, --config         A JSON experiment config to start from
  --dataset            The dataset name (defaults to 'compuframes')
  --cv-folder          The cross-validation folder (defaults to 'cv')
  -e, --expt-folder    The experiment output folder (defaults to 'experiment')
  -m, --model          The model to evaluate (e.g., 'random')
  -s, --seed           Model seed (defaults to 1)
  -t, --threshold      Decision threshold for models that score labels
  -f, --fold           Comma-separated folds to run (defaults to all)
";

#[derive(Debug)]
struct Args {
    mode: String,
    overrides: ConfigOverrides,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            overrides: ConfigOverrides::parse(&mut pargs)?,
            mode: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: MODE"),
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = match Args::parse()? {
        Some(args) => args,
        None => {
            print!("{}", HELP);

            return Ok(());
        }
    };

    let mode = RunMode::try_from(args.mode.as_str())?;
    let config = args.overrides.resolve()?;

    let experiment = Experiment::new(config);

    match mode {
        RunMode::Run => {
            let config = experiment.config();
            config.save(
                config
                    .expt_folder
                    .join(&config.dataset)
                    .join(&config.model)
                    .join(CONFIG_FILE),
            )?;

            for (fold, report) in experiment.run()? {
                log::info!(
                    "fold-{}: {} evaluated, {} skipped, {} metrics",
                    fold,
                    report.evaluated,
                    report.skipped,
                    report.metrics.len()
                );
            }
        }
        RunMode::Summarize => {
            for summary in experiment.summarize()? {
                println!("{}\t{:.4}\t{}", summary.name, summary.mean, summary.folds);
            }
        }
        RunMode::Preprocess | RunMode::CreateCv => {
            return Err(anyhow!("{} is handled by the prepare tool", mode));
        }
    }

    Ok(())
}
