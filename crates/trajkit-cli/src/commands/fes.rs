use crate::cli::FesArgs;
use crate::error::{CliError, Result};
use tracing::info;
use trajkit::core::analysis::fes::{FesOptions, FreeEnergy};
use trajkit::core::io::series::read_columns;
use trajkit::core::io::tables::{write_fes_1d, write_fes_2d};

pub fn run(args: FesArgs) -> Result<()> {
    let mut columns = vec![args.x.as_str()];
    columns.extend(args.y.as_deref());
    columns.extend(args.weights.as_deref());

    let mut data = read_columns(&args.input, &columns)
        .map_err(|e| CliError::parsing(&args.input, e))?
        .into_iter();
    let x = data.next().unwrap_or_default();
    let y = args.y.as_ref().map(|_| data.next().unwrap_or_default());
    let weights = args.weights.as_ref().map(|_| data.next().unwrap_or_default());
    info!("Read {} samples from {:?}", x.len(), &args.input);

    let free_energy = FreeEnergy::new(args.temperature, args.unit)?;
    let mut options = FesOptions::new(args.bins);
    options.weights = weights.as_deref();
    options.zero = args.zero;
    options.fill_empty = !args.no_fill;

    match &y {
        None => {
            let fes = free_energy.fes_1d(&x, &options)?;
            write_fes_1d(&args.output, &fes).map_err(|e| CliError::writing(&args.output, e))?;
        }
        Some(y) => {
            let fes = free_energy.fes_2d(&x, y, &options)?;
            write_fes_2d(&args.output, &fes).map_err(|e| CliError::writing(&args.output, e))?;
        }
    }

    println!(
        "{}D free-energy surface ({} bins, T = {} K, unit {}) -> {}",
        if y.is_some() { 2 } else { 1 },
        args.bins,
        args.temperature,
        args.unit,
        args.output.display()
    );
    Ok(())
}
