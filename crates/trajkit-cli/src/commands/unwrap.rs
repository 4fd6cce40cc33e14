use crate::cli::UnwrapArgs;
use crate::error::{CliError, Result};
use nalgebra::Vector3;
use tracing::info;
use trajkit::core::dynamics::unwrap::unwrap;
use trajkit::core::io::series::{read_coordinate_series, write_coordinate_series};
use trajkit::engine::error::EngineError;

pub fn run(args: UnwrapArgs) -> Result<()> {
    let series =
        read_coordinate_series(&args.input).map_err(|e| CliError::parsing(&args.input, e))?;

    let boxes = match (series.boxes, args.box_length) {
        (Some(boxes), None) => boxes,
        (None, Some(length)) => vec![Vector3::repeat(length); series.positions.len()],
        (Some(_), Some(_)) => {
            return Err(CliError::Argument(format!(
                "{:?} already gives per-frame box lengths; --box cannot be combined with them.",
                args.input
            )));
        }
        (None, None) => {
            return Err(CliError::Argument(format!(
                "{:?} has no box columns (lx, ly, lz); pass --box LENGTH.",
                args.input
            )));
        }
    };

    let unwrapped = unwrap(&series.positions, &boxes, args.method).map_err(EngineError::from)?;
    write_coordinate_series(&args.output, &unwrapped)
        .map_err(|e| CliError::writing(&args.output, e))?;

    info!(
        "Unwrapped {} frames with the {} method.",
        unwrapped.len(),
        args.method
    );
    println!(
        "Unwrapped {} frames ({}) -> {}",
        unwrapped.len(),
        args.method,
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;
    use trajkit::core::dynamics::unwrap::UnwrapMethod;

    fn args(input: &Path, output: &Path, method: UnwrapMethod, box_length: Option<f64>) -> UnwrapArgs {
        UnwrapArgs {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            method,
            box_length,
        }
    }

    fn read_xs(path: &Path) -> Vec<f64> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(|line| line.split(',').nth(1).unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn cubic_box_from_the_command_line_is_applied() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("com.csv");
        let output = dir.path().join("unwrapped.csv");
        fs::write(&input, "x,y,z\n5.0,0,0\n9.5,0,0\n0.5,0,0\n").unwrap();

        run(args(&input, &output, UnwrapMethod::Displacement, Some(10.0))).unwrap();

        let xs = read_xs(&output);
        assert_eq!(xs.len(), 3);
        assert!((xs[1] - 9.5).abs() < 1e-9);
        assert!((xs[2] - 10.5).abs() < 1e-9);
    }

    #[test]
    fn per_frame_boxes_from_the_file_are_used() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("com.csv");
        let output = dir.path().join("unwrapped.csv");
        fs::write(
            &input,
            "x,y,z,lx,ly,lz\n9.5,1,1,10,10,10\n0.5,1,1,10,10,10\n1.0,1,1,12,12,12\n",
        )
        .unwrap();

        run(args(&input, &output, UnwrapMethod::Hybrid, None)).unwrap();

        let xs = read_xs(&output);
        assert!((xs[1] - 10.5).abs() < 1e-9);
        assert!((xs[2] - 13.0).abs() < 1e-9);
    }

    #[test]
    fn box_must_come_from_exactly_one_place() {
        let dir = tempdir().unwrap();
        let bare = dir.path().join("bare.csv");
        let boxed = dir.path().join("boxed.csv");
        let output = dir.path().join("out.csv");
        fs::write(&bare, "x,y,z\n1,1,1\n").unwrap();
        fs::write(&boxed, "x,y,z,lx,ly,lz\n1,1,1,10,10,10\n").unwrap();

        assert!(matches!(
            run(args(&bare, &output, UnwrapMethod::Hybrid, None)),
            Err(CliError::Argument(_))
        ));
        assert!(matches!(
            run(args(&boxed, &output, UnwrapMethod::Hybrid, Some(10.0))),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn non_positive_box_is_reported_by_the_core() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("com.csv");
        fs::write(&input, "x,y,z\n1,1,1\n2,2,2\n").unwrap();
        let result = run(args(
            &input,
            &dir.path().join("out.csv"),
            UnwrapMethod::Heuristic,
            Some(0.0),
        ));
        assert!(matches!(result, Err(CliError::Core(_))));
    }
}
