use super::*;

#[test]
fn test_new_grid_is_empty() {
  let grid = OccupancyGrid::new();
  assert!(grid.is_empty());
  assert!(!grid.is_full());
  assert_eq!(grid.solid_count(), 0);
}

#[test]
fn test_full_grid() {
  let grid = OccupancyGrid::full();
  assert!(grid.is_full());
  assert_eq!(grid.solid_count(), REGION_SIZE_CB as u32);
}

#[test]
fn test_set_and_clear_cell() {
  let mut grid = OccupancyGrid::new();
  grid.set(3, 9, 14);
  assert!(grid.is_solid(3, 9, 14));
  assert!(!grid.is_solid(9, 3, 14));
  assert_eq!(grid.solid_count(), 1);

  grid.clear_cell(3, 9, 14);
  assert!(grid.is_empty());
}

#[test]
fn test_from_fn_matches_predicate() {
  let grid = OccupancyGrid::from_fn(|x, y, z| (x + y + z) % 3 == 0);
  for z in 0..REGION_SIZE {
    for y in 0..REGION_SIZE {
      for x in 0..REGION_SIZE {
        assert_eq!(grid.is_solid(x, y, z), (x + y + z) % 3 == 0);
      }
    }
  }
}

#[test]
fn test_slice_layout() {
  let grid = OccupancyGrid::from_fn(|x, y, z| z == 2 && y == 0 && x < 16);
  assert_eq!(grid.slice(2)[0], 0xFFFF);
  assert_eq!(slice_row(grid.slice(2), 0), 0xFFFF);
  assert_eq!(grid.slice(1), &[0; SLICE_WORDS]);
}

#[test]
fn test_from_words_roundtrip() {
  let grid = OccupancyGrid::from_fn(|x, y, z| x * y == z);
  let words: [u64; GRID_WORDS] = grid.words().try_into().unwrap();
  assert_eq!(OccupancyGrid::from_words(&words), grid);
}

#[test]
fn test_axis_index() {
  assert_eq!(Axis::ALL.map(Axis::index), [0, 1, 2]);
}
