//! Runs mesh extraction on a dedicated worker thread.
//!
//! Extraction is the single long-running CPU-bound stage of the pipeline, so
//! it is designed to be moved off the caller's thread: the volume is handed
//! to the worker by ownership, progress events flow back over a channel, and
//! the finished mesh is returned by ownership. No state is shared beyond the
//! cancellation flag, so no locking is involved.

use std::sync::mpsc;
use std::thread;

use voxelmesh_volume::Volume;

use crate::{
  extract_mesh, CancellationFlag, ExtractError, ExtractionOptions,
  MeshOutcome,
};

/// An event published by an extraction worker. All progress events precede
/// the final `Finished` event, and progress values are non-decreasing.
///
#[derive(Debug)]
pub enum ExtractionEvent {
  Progress(f32),
  Finished(Result<MeshOutcome, ExtractError>),
}

/// A handle to a running extraction worker.
///
pub struct ExtractionHandle {
  events: mpsc::Receiver<ExtractionEvent>,
  cancellation: CancellationFlag,
  join_handle: thread::JoinHandle<()>,
}

impl ExtractionHandle {
  /// Returns the receiving end of the worker's event stream.
  ///
  pub fn events(&self) -> &mpsc::Receiver<ExtractionEvent> {
    &self.events
  }

  /// Requests cancellation. The worker observes the request at its next
  /// chunk boundary and finishes with `Cancelled`.
  ///
  pub fn cancel(&self) {
    self.cancellation.cancel();
  }

  /// Blocks until the worker finishes and returns its result, discarding
  /// any progress events still in flight.
  ///
  pub fn wait(self) -> Result<MeshOutcome, ExtractError> {
    let mut result = Err(ExtractError::Cancelled);

    for event in self.events.iter() {
      if let ExtractionEvent::Finished(finished) = event {
        result = finished;
        break;
      }
    }

    let _ = self.join_handle.join();

    result
  }
}

/// Spawns a worker thread that extracts a mesh from the given volume. The
/// volume is moved into the worker; the mesh is moved back out through the
/// final [`ExtractionEvent::Finished`] event.
///
pub fn spawn_extraction(
  volume: Volume,
  options: ExtractionOptions,
) -> ExtractionHandle {
  let (sender, events) = mpsc::channel();
  let cancellation = CancellationFlag::new();

  let worker_cancellation = cancellation.clone();

  let join_handle = thread::spawn(move || {
    let progress_sender = sender.clone();

    let result = extract_mesh(
      &volume,
      &options,
      &mut |progress| {
        let _ = progress_sender.send(ExtractionEvent::Progress(progress));
      },
      &worker_cancellation,
    );

    // The receiver may already be gone if the caller stopped listening
    let _ = sender.send(ExtractionEvent::Finished(result));
  });

  ExtractionHandle {
    events,
    cancellation,
    join_handle,
  }
}

#[cfg(test)]
mod tests {
  use voxelmesh_volume::{Dimensions, VolumeMetadata};

  use super::*;

  fn ramp_volume() -> Volume {
    let mut field = vec![0.0f32; 64];
    for z in 0..4 {
      for i in 0..16 {
        field[z * 16 + i] = z as f32;
      }
    }

    Volume {
      dimensions: Dimensions {
        width: 4,
        height: 4,
        depth: 4,
      },
      spacing: [1.0, 1.0, 1.0],
      origin: [0.0, 0.0, 0.0],
      orientation: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
      field,
      min: 0.0,
      max: 3.0,
      auto_iso: 1.5,
      display_stack: vec![],
      metadata: VolumeMetadata::default(),
    }
  }

  #[test]
  fn worker_delivers_progress_then_mesh_test() {
    let handle =
      spawn_extraction(ramp_volume(), ExtractionOptions::new(1.5));

    let mut progress_values = vec![];
    let mut result = None;

    for event in handle.events().iter() {
      match event {
        ExtractionEvent::Progress(value) => {
          // No progress arrives after the result
          assert!(result.is_none());
          progress_values.push(value);
        }
        ExtractionEvent::Finished(finished) => {
          result = Some(finished);
          break;
        }
      }
    }

    assert!(progress_values.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(*progress_values.last().unwrap(), 1.0);

    let mesh = result.unwrap().unwrap().mesh().unwrap();
    assert_eq!(mesh.vertex_count(), 16);
  }

  #[test]
  fn worker_cancellation_test() {
    let handle =
      spawn_extraction(ramp_volume(), ExtractionOptions::new(1.5));

    handle.cancel();

    // Cancellation either lands before the first chunk boundary or the
    // extraction completes first; both are valid outcomes of a race
    match handle.wait() {
      Err(ExtractError::Cancelled) | Ok(_) => (),
      Err(other) => panic!("unexpected error: {}", other),
    }
  }
}
