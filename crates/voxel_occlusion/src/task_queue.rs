//! Task queues for parallel region compression.
//!
//! Two flavours over the same work:
//!
//! - [`CompressionStage`]: Enqueue → Tick → Completions, blocking on `tick`
//! - [`AsyncCompressionStage`]: one batch on rayon's pool, polled each frame
//!
//! ```text
//! Main Thread                       Async (rayon)
//! ┌────────────────┐
//! │ start(batch)   │───────────────▶┌──────────────────┐
//! └────────────────┘                │ compress regions │
//!                                   │ (one compressor  │
//! ┌────────────────┐                │  per worker)     │
//! │ poll_results() │◀───────────────└──────────────────┘
//! └────────────────┘
//! ```
//!
//! Each worker owns its own [`RegionCompressor`] scratch. Output is
//! immutable [`RegionOcclusionData`] behind an `Arc`, handed to the render
//! thread as is. Stale work is cancelled by dropping the receiver; the worker
//! finishes and its send fails silently.

use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, TryRecvError};
use glam::IVec3;
use rayon::prelude::*;
use web_time::Instant;

use crate::region::{RegionCompressor, RegionOcclusionData};
use crate::types::OccupancyGrid;

/// Request to compress one region's occupancy grid.
pub struct CompressionRequest {
  pub id: u64,
  pub region: IVec3,
  pub grid: Box<OccupancyGrid>,
}

/// Compressed region.
pub struct CompressionCompletion {
  /// Request ID this completion corresponds to
  pub id: u64,
  pub region: IVec3,
  pub data: Arc<RegionOcclusionData>,
  /// Raw compression time in microseconds
  pub compress_time_us: u64,
}

fn compress_request(compressor: &mut RegionCompressor, request: CompressionRequest) -> CompressionCompletion {
  let start = Instant::now();
  let data = compressor.compress(&request.grid);
  CompressionCompletion {
    id: request.id,
    region: request.region,
    data: Arc::new(data),
    compress_time_us: start.elapsed().as_micros() as u64,
  }
}

/// Compression stage that processes requests in parallel.
#[derive(Default)]
pub struct CompressionStage {
  pending: Vec<CompressionRequest>,
  completed: Vec<CompressionCompletion>,
  next_id: u64,
}

impl CompressionStage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Enqueue a region, returning the assigned ID.
  pub fn enqueue(&mut self, region: IVec3, grid: Box<OccupancyGrid>) -> u64 {
    let id = self.next_id;
    self.next_id += 1;
    self.pending.push(CompressionRequest { id, region, grid });
    id
  }

  /// Process pending requests in parallel and move completions to output.
  /// Returns the number of requests processed this tick.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "compression_stage::tick"))]
  pub fn tick(&mut self) -> usize {
    if self.pending.is_empty() {
      return 0;
    }

    let requests = std::mem::take(&mut self.pending);
    let count = requests.len();

    let completions: Vec<CompressionCompletion> = requests
      .into_par_iter()
      .map_init(RegionCompressor::new, compress_request)
      .collect();

    self.completed.extend(completions);
    count
  }

  /// Take all completed regions, in enqueue order.
  pub fn drain_completions(&mut self) -> Vec<CompressionCompletion> {
    std::mem::take(&mut self.completed)
  }

  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }

  pub fn completed_count(&self) -> usize {
    self.completed.len()
  }

  /// True when no work remains.
  pub fn is_idle(&self) -> bool {
    self.pending.is_empty() && self.completed.is_empty()
  }
}

/// Non-blocking batch compression on rayon's thread pool.
#[derive(Default)]
pub struct AsyncCompressionStage {
  receiver: Option<Receiver<Vec<CompressionCompletion>>>,
  next_id: u64,
}

impl AsyncCompressionStage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if a batch is running.
  pub fn is_busy(&self) -> bool {
    self.receiver.is_some()
  }

  /// Start compressing a batch.
  ///
  /// Returns `true` if started, `false` if already busy.
  pub fn start(&mut self, batch: Vec<(IVec3, Box<OccupancyGrid>)>) -> bool {
    if self.is_busy() {
      return false;
    }

    let first_id = self.next_id;
    self.next_id += batch.len() as u64;

    let requests: Vec<CompressionRequest> = batch
      .into_iter()
      .zip(first_id..)
      .map(|((region, grid), id)| CompressionRequest { id, region, grid })
      .collect();

    let (sender, receiver) = channel::bounded(1);
    self.receiver = Some(receiver);

    rayon::spawn(move || {
      let completions: Vec<CompressionCompletion> = requests
        .into_par_iter()
        .map_init(RegionCompressor::new, compress_request)
        .collect();
      // Receiver dropped = cancelled
      let _ = sender.send(completions);
    });

    true
  }

  /// Poll for results (non-blocking).
  ///
  /// Returns `Some(completions)` when the batch is done, `None` if still
  /// running or nothing was started.
  pub fn poll_results(&mut self) -> Option<Vec<CompressionCompletion>> {
    let receiver = self.receiver.as_ref()?;

    match receiver.try_recv() {
      Ok(completions) => {
        self.receiver = None;
        Some(completions)
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        self.receiver = None;
        None
      }
    }
  }

  /// Drop the running batch's output.
  pub fn cancel(&mut self) {
    self.receiver = None;
  }
}

#[cfg(test)]
#[path = "task_queue_test.rs"]
mod task_queue_test;
