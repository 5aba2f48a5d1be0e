use std::time::Duration;

use super::*;
use crate::packed_box::PackedBox;

fn floor_grid() -> Box<OccupancyGrid> {
  Box::new(OccupancyGrid::from_fn(|_, y, _| y < 4))
}

fn wait_for(stage: &mut AsyncCompressionStage) -> Vec<CompressionCompletion> {
  for _ in 0..1000 {
    if let Some(completions) = stage.poll_results() {
      return completions;
    }
    std::thread::sleep(Duration::from_millis(5));
  }
  panic!("compression batch did not finish");
}

#[test]
fn test_single_request() {
  let mut stage = CompressionStage::new();

  let id = stage.enqueue(IVec3::new(1, 2, 3), Box::new(OccupancyGrid::full()));
  assert_eq!(id, 0);
  assert_eq!(stage.pending_count(), 1);

  let processed = stage.tick();
  assert_eq!(processed, 1);
  assert_eq!(stage.pending_count(), 0);
  assert_eq!(stage.completed_count(), 1);

  let completions = stage.drain_completions();
  assert_eq!(completions.len(), 1);
  assert_eq!(completions[0].id, 0);
  assert_eq!(completions[0].region, IVec3::new(1, 2, 3));
  assert_eq!(completions[0].data.boxes.as_slice(), &[PackedBox::FULL]);
  assert!(stage.is_idle());
}

#[test]
fn test_multiple_requests() {
  let mut stage = CompressionStage::new();

  for i in 0..8 {
    stage.enqueue(IVec3::new(i, 0, 0), floor_grid());
  }
  stage.enqueue(IVec3::new(8, 0, 0), Box::new(OccupancyGrid::new()));
  assert_eq!(stage.pending_count(), 9);

  assert_eq!(stage.tick(), 9);
  let completions = stage.drain_completions();

  let ids: Vec<u64> = completions.iter().map(|c| c.id).collect();
  assert_eq!(ids, (0..9).collect::<Vec<u64>>());

  // Same input, same output regardless of worker
  for completion in &completions[1..8] {
    assert_eq!(completion.data, completions[0].data);
  }
  assert_eq!(completions[0].data.solid_count, 16 * 16 * 4);
  assert!(completions[8].data.is_empty());
}

#[test]
fn test_empty_tick() {
  let mut stage = CompressionStage::new();
  assert!(stage.is_idle());

  assert_eq!(stage.tick(), 0);
  assert!(stage.is_idle());
}

#[test]
fn test_async_batch() {
  let mut stage = AsyncCompressionStage::new();
  assert!(!stage.is_busy());
  assert!(stage.poll_results().is_none());

  let batch = vec![(IVec3::ZERO, floor_grid()), (IVec3::X, Box::new(OccupancyGrid::full()))];
  assert!(stage.start(batch));
  assert!(stage.is_busy());
  // One batch at a time
  assert!(!stage.start(Vec::new()));

  let completions = wait_for(&mut stage);
  assert!(!stage.is_busy());
  assert_eq!(completions.len(), 2);
  assert_eq!(completions[0].id, 0);
  assert_eq!(completions[1].region, IVec3::X);
  assert!(completions[1].data.is_full());

  // IDs keep counting across batches
  assert!(stage.start(vec![(IVec3::Y, floor_grid())]));
  assert_eq!(wait_for(&mut stage)[0].id, 2);
}

#[test]
fn test_async_cancel() {
  let mut stage = AsyncCompressionStage::new();
  assert!(stage.start(vec![(IVec3::ZERO, floor_grid())]));
  stage.cancel();
  assert!(!stage.is_busy());
  assert!(stage.poll_results().is_none());

  // Free to start again
  assert!(stage.start(vec![(IVec3::ZERO, floor_grid())]));
  assert_eq!(wait_for(&mut stage).len(), 1);
}
