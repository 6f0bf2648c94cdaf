use std::time::Duration;

use clap::Parser;

use fsmcheck::config::OracleConfig;
use fsmcheck::error::Error;
use fsmcheck::events::{Action, Event};
use fsmcheck::graph::Model;
use fsmcheck::model::Composition;
use fsmcheck::sat::BddOracle;
use fsmcheck::verifier::{RunStatus, Verifier};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Inject modeling errors into the level crossing.
    #[clap(long)]
    buggy: bool,

    /// Report every violation instead of stopping at the first one.
    #[clap(long)]
    all: bool,

    /// Verify the model together with its proof model.
    #[clap(long)]
    proof: bool,

    /// Timeout of each SAT query, in milliseconds.
    #[clap(long, value_name = "MS", default_value = "10000")]
    timeout: u64,

    /// Log level.
    #[clap(long, value_name = "LEVEL", default_value = "info")]
    log: simplelog::LevelFilter,
}

/// A level crossing: a barrier closes when a train approaches and the light blinks while it is closed.
fn level_crossing(buggy: bool) -> Result<Model, Error> {
    let mut model = Model::new("crossing");
    let closed = model.variables().boolean("CLOSED")?;
    let blinking = model.variables().boolean("BLINKING")?;

    let barrier = model.add_machine("barrier")?;
    barrier.add_transition("0", "open", [], None, [Action::assign(closed.clone(), false)]);
    barrier.add_transition(
        "open",
        "closed",
        [Event::external("train_approaching")],
        None,
        [Action::assign(closed.clone(), true), Action::emit("barrier_down")],
    );
    barrier.add_transition(
        "closed",
        "open",
        [Event::external("train_gone")],
        None,
        [Action::assign(closed.clone(), false)],
    );

    let is_closed = model.parse_guard("CLOSED")?;
    let is_open = model.parse_guard(if buggy { "CLOSED OR BLINKING" } else { "NOT CLOSED" })?;
    let is_blinking = model.parse_guard("BLINKING")?;
    let light = model.add_machine("light")?;
    light.add_transition("0", "off", [], None, [Action::assign(blinking.clone(), false)]);
    light.add_transition(
        "off",
        "on",
        [Event::synchronization("barrier_down")],
        is_closed,
        [Action::assign(blinking.clone(), true)],
    );
    light.add_transition(
        "on",
        "off",
        [Event::change(closed.clone(), false)],
        is_open,
        [Action::assign(blinking.clone(), false)],
    );
    light.add_transition("on", "on", [Event::external("tick")], is_blinking, [Action::emit("flash")]);
    if buggy {
        // The barrier owns CLOSED.
        light.add_transition(
            "on",
            "on",
            [Event::change(closed.clone(), false)],
            None,
            [Action::assign(closed, true)],
        );
    }

    Ok(model)
}

/// Observes that the light blinks whenever the barrier is closed.
fn proof_model(primary: &Model) -> Result<Model, Error> {
    let mut proof = Model::with_variables("proof", primary.variables().clone());
    let unsafe_state = proof.parse_guard("CLOSED AND NOT BLINKING")?;
    let observer = proof.add_machine("observer")?;
    observer.add_transition("0", "watching", [], None, []);
    observer.add_transition("watching", "alarm", [Event::external("tick")], unsafe_state, []);
    Ok(proof)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        args.log,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();
    println!("args = {:?}", args);

    let model = level_crossing(args.buggy)?;
    let config = OracleConfig::default().with_timeout(Duration::from_millis(args.timeout));
    println!("oracle config = {:?}", config);

    let run = if args.proof {
        let proof = proof_model(&model)?;
        let composed = Composition::new(&model, &proof)?;
        let verifier = Verifier::standard(BddOracle::new(config));
        if args.all {
            verifier.check_all(&composed)
        } else {
            verifier.check(&composed)
        }
    } else {
        let verifier = Verifier::standard(BddOracle::new(config));
        if args.all {
            verifier.check_all(&model)
        } else {
            verifier.check(&model)
        }
    };

    for report in run.reports() {
        println!("{}", report.message());
    }
    match run.status() {
        RunStatus::Success => println!("All properties verified"),
        RunStatus::Failed => println!("{} violations found", run.violations().count()),
        RunStatus::Aborted(e) => println!("Verification aborted: {}", e),
    }

    let time_total = time_total.elapsed();
    println!("Total time: {:.3} s", time_total.as_secs_f64());

    Ok(())
}
