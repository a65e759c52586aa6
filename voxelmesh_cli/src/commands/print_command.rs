use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use voxelmesh::core::VoxelmeshError;
use voxelmesh::volume::{assemble, Volume};

use crate::input::{load_slices, LoadError};

pub const ABOUT: &str =
  "Prints the study metadata and derived geometry of a DICOM series";

#[derive(Args)]
pub struct PrintArgs {
  #[clap(help = "The directory containing the DICOM slices of one series")]
  input_dir: PathBuf,
}

pub fn run(args: &PrintArgs) -> ExitCode {
  let slices = match load_slices(&args.input_dir) {
    Ok(slices) => slices,
    Err(LoadError::Io(details)) => {
      eprintln!("Failed to read input directory: {}", details);
      return ExitCode::from(1);
    }
    Err(LoadError::Read(e)) => {
      e.print("loading slices");
      return ExitCode::from(1);
    }
  };

  let series = match assemble(slices) {
    Ok(series) => series,
    Err(e) => {
      e.print("assembling series");
      return ExitCode::from(1);
    }
  };

  let metadata = series.metadata.clone();
  let has_orientation = series.has_orientation;
  let volume = Volume::from_series(series);

  let optional = |value: &Option<String>| match value {
    Some(value) => value.clone(),
    None => "<absent>".to_string(),
  };

  println!("Patient ID:             {}", optional(&metadata.patient_id));
  println!(
    "Study instance UID:     {}",
    optional(&metadata.study_instance_uid)
  );
  println!(
    "Series instance UID:    {}",
    optional(&metadata.series_instance_uid)
  );
  println!(
    "Frame of reference UID: {}",
    optional(&metadata.frame_of_reference_uid)
  );
  println!("Modality:               {}", optional(&metadata.modality));
  println!("Study date:             {}", optional(&metadata.study_date));
  println!();

  let dims = volume.dimensions;
  println!(
    "Dimensions:   {} x {} x {} voxels",
    dims.width, dims.height, dims.depth
  );
  println!(
    "Spacing:      {:.4} x {:.4} x {:.4} mm",
    volume.spacing[0], volume.spacing[1], volume.spacing[2]
  );
  println!(
    "Origin:       ({:.2}, {:.2}, {:.2}) mm",
    volume.origin[0], volume.origin[1], volume.origin[2]
  );
  println!(
    "Orientation:  row ({:.3}, {:.3}, {:.3}), col ({:.3}, {:.3}, {:.3}){}",
    volume.orientation[0],
    volume.orientation[1],
    volume.orientation[2],
    volume.orientation[3],
    volume.orientation[4],
    volume.orientation[5],
    if has_orientation {
      ""
    } else {
      " (approximate)"
    }
  );
  println!();

  println!("Scalar range: [{:.2}, {:.2}]", volume.min, volume.max);
  println!("Auto iso:     {:.2}", volume.auto_iso);

  if volume.metadata.uncalibrated {
    println!();
    println!("Note: contains JPEG-decoded slices without rescale calibration");
  }

  ExitCode::SUCCESS
}
