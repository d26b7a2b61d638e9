use clap::Parser;
use life_mesh::cli::Cli;
use life_mesh::driver::DistributedDriver;
use life_mesh::engine::{LifeEngine, SimulationEngine};
use life_mesh::error::{AppError, Result};
use life_mesh::topology::ProcessTopology;
use life_mesh::transport::{Communicator, ThreadCommunicator};
use tracing::info;

/// Default seed when no `--input` is given: a single glider on an 11x17
/// torus.
fn default_seed() -> LifeEngine {
    let mut engine = LifeEngine::new(11, 17);
    engine.init(&[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);
    engine
}

fn run(cli: Cli) -> Result<()> {
    let topology = ProcessTopology::new(cli.proc_rows, cli.proc_cols, cli.world_size())?;
    let comms = ThreadCommunicator::build(topology, cli.root);

    let seed = match &cli.input {
        Some(_) => None,
        None => Some(default_seed()),
    };
    let seed_ref = seed.as_ref();

    let results: Vec<Result<()>> = std::thread::scope(|scope| {
        let handles: Vec<_> = comms
            .into_iter()
            .map(|comm| {
                let cli = &cli;
                scope.spawn(move || -> Result<()> {
                    let mut driver = match (&cli.input, seed_ref) {
                        (Some(path), _) => {
                            DistributedDriver::from_distributed_read(path, topology, comm.rank(), &comm, cli.root)?
                        }
                        (None, Some(seed)) => DistributedDriver::from_seed(seed, topology, comm.rank()),
                        (None, None) => unreachable!("seed is always Some when input is None"),
                    };

                    driver.run(cli.ticks, &comm)?;
                    driver.write_output(&cli.output, &comm, cli.root)?;

                    if comm.rank() == cli.root {
                        info!(ticks = cli.ticks, output = %cli.output.display(), "simulation complete");
                    }
                    Ok(())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().expect("worker thread panicked")).collect()
    });

    results.into_iter().collect::<Result<Vec<()>>>()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    run(cli).map_err(|err: AppError| {
        tracing::error!(%err, "fatal error");
        err
    })
}
