use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use voxelmesh::core::VoxelmeshError;
use voxelmesh::p10::ReadError;
use voxelmesh::surface::worker::{spawn_extraction, ExtractionEvent};
use voxelmesh::surface::{
  recompute_normals, taubin_smooth_with, write_stl_file, ExtractError,
  ExtractionOptions, MeshOutcome,
};
use voxelmesh::volume::{assemble, AssembleError, Volume};

use crate::input::{load_slices, LoadError};

pub const ABOUT: &str =
  "Converts a directory of DICOM slices to an iso-surface mesh in binary \
   STL format";

#[derive(Args)]
pub struct ConvertArgs {
  #[clap(help = "The directory containing the DICOM slices of one series")]
  input_dir: PathBuf,

  #[clap(help = "The name of the STL file to write the mesh to")]
  output_mesh: PathBuf,

  #[arg(
    long,
    help = "The iso-value at which to extract the surface, in modality \
      units. Defaults to an automatically detected Otsu threshold."
  )]
  iso: Option<f32>,

  #[arg(
    long,
    default_value_t = 64,
    help = "Chunk side length in voxels used by the extractor"
  )]
  chunk: usize,

  #[arg(
    long,
    default_value_t = 2,
    help = "Number of Taubin smoothing iterations applied to the mesh"
  )]
  smooth_iter: usize,
}

/// Exit codes: 0 success, 2 unsupported transfer syntax, 3 inconsistent
/// series, 4 iso-value out of range, 5 cancelled, 1 anything else.
///
pub fn run(args: &ConvertArgs) -> ExitCode {
  let slices = match load_slices(&args.input_dir) {
    Ok(slices) => slices,
    Err(LoadError::Io(details)) => {
      eprintln!("Failed to read input directory: {}", details);
      return ExitCode::from(1);
    }
    Err(LoadError::Read(e)) => {
      e.print("loading slices");

      return match e {
        ReadError::UnsupportedTransferSyntax { .. } => ExitCode::from(2),
        _ => ExitCode::from(1),
      };
    }
  };

  let series = match assemble(slices) {
    Ok(series) => series,
    Err(e) => {
      e.print("assembling series");

      return match e {
        AssembleError::InconsistentSeries { .. } => ExitCode::from(3),
        AssembleError::EmptySeries => ExitCode::from(1),
      };
    }
  };

  let volume = Volume::from_series(series);

  let iso = args.iso.unwrap_or(volume.auto_iso);
  println!("Extracting surface at iso-value {:.3}", iso);

  let mut options = ExtractionOptions::new(iso);
  options.chunk_size = args.chunk;

  let handle = spawn_extraction(volume, options);

  let mut outcome = None;
  for event in handle.events().iter() {
    match event {
      ExtractionEvent::Progress(progress) => {
        log::info!("Extraction progress: {:.0}%", progress * 100.0);
      }
      ExtractionEvent::Finished(result) => {
        outcome = Some(result);
        break;
      }
    }
  }

  let mut mesh = match outcome {
    Some(Ok(MeshOutcome::Surface(mesh))) => mesh,
    Some(Ok(MeshOutcome::Empty)) => {
      println!("The iso-surface intersects no cell, no mesh was written");
      return ExitCode::from(1);
    }
    Some(Err(e)) => {
      e.print("extracting mesh");

      return match e {
        ExtractError::IsoOutOfRange { .. } => ExitCode::from(4),
        ExtractError::Cancelled => ExitCode::from(5),
        _ => ExitCode::from(1),
      };
    }
    None => {
      eprintln!("The extraction worker terminated unexpectedly");
      return ExitCode::from(1);
    }
  };

  taubin_smooth_with(&mut mesh, args.smooth_iter);
  recompute_normals(&mut mesh);

  if let Err(e) = write_stl_file(&mesh, &args.output_mesh) {
    eprintln!("Failed to write STL file: {}", e);
    return ExitCode::from(1);
  }

  println!(
    "Wrote mesh with {} vertices and {} triangles",
    mesh.vertex_count(),
    mesh.triangle_count()
  );
  println!(
    "Bounding box: [{:.2}, {:.2}, {:.2}] to [{:.2}, {:.2}, {:.2}] mm",
    mesh.bounding_box.min[0],
    mesh.bounding_box.min[1],
    mesh.bounding_box.min[2],
    mesh.bounding_box.max[0],
    mesh.bounding_box.max[1],
    mesh.bounding_box.max[2],
  );

  ExitCode::SUCCESS
}
