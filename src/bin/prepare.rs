//! Command line tool to format a corpus and create its cross-validation folds

use anyhow::anyhow;
use multilabel_cv::{
    cli::{ConfigOverrides, RunMode},
    experiment::{config::CONFIG_FILE, Experiment},
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: prepare MODE [OPTIONS]

Arguments:
  MODE                 What to prepare ('preprocess' or 'create-cv')

Options:
  -h, --help           Print help
  -c, --config         A JSON experiment config to start from
  -j, --json-file      The annotated corpus (defaults to 'corpus.json')
  --dataset            The dataset name (defaults to 'compuframes')
  -d, --data-folder    The top-level data folder (defaults to 'data')
  --cv-folder          The cross-validation folder (defaults to 'cv')
  -e, --expt-folder    Where the resolved config is saved (defaults to 'experiment')
  -k, --num-folds      Number of folds (defaults to 5)
  -r, --ratio          Train to dev ratio of the non-test documents (defaults to 0.8)
  -s, --seed           Random seed (defaults to 1)
  --stratify           Keep documents with the same first label spread across folds
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
    config.save(config.expt_folder.join(CONFIG_FILE))?;

    let experiment = Experiment::new(config);

    match mode {
        RunMode::Preprocess => {
            let summary = experiment.preprocess()?;
            log::info!("Formatted {}", summary);
        }
        RunMode::CreateCv => {
            let outcomes = experiment.create_cv()?;
            let ready = outcomes.iter().filter(|outcome| outcome.is_ready()).count();
            log::info!("{} of {} folds ready", ready, outcomes.len());
        }
        RunMode::Run | RunMode::Summarize => {
            return Err(anyhow!("{} is handled by the experiment tool", mode));
        }
    }

    Ok(())
}
