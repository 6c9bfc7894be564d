//! Fixed-size placement surface.
//!
//! Cells are stored row-major: index = y * width + x. Every "all occupied
//! cells" walk uses that order, so tick effects and random destruction are
//! reproducible for a given seed.

use crate::{
    catalog::EntityType,
    error::{SimError, SimResult},
    types::Coord,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width:  u32,
    height: u32,
    cells:  Vec<Option<Arc<EntityType>>>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, x: Coord, y: Coord) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: Coord, y: Coord) -> SimResult<usize> {
        if !self.in_bounds(x, y) {
            return Err(SimError::OutOfBounds {
                x,
                y,
                width:  self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: Coord, y: Coord) -> SimResult<Option<&Arc<EntityType>>> {
        let i = self.index(x, y)?;
        Ok(self.cells[i].as_ref())
    }

    pub fn is_occupied(&self, x: Coord, y: Coord) -> SimResult<bool> {
        Ok(self.get(x, y)?.is_some())
    }

    /// Store `entity` at an empty cell. Occupied cells are never overwritten.
    pub fn put(&mut self, x: Coord, y: Coord, entity: Arc<EntityType>) -> SimResult<()> {
        let i = self.index(x, y)?;
        if self.cells[i].is_some() {
            return Err(SimError::CellOccupied { x, y });
        }
        self.cells[i] = Some(entity);
        Ok(())
    }

    /// Clear a cell, returning whatever was there.
    pub fn take(&mut self, x: Coord, y: Coord) -> SimResult<Option<Arc<EntityType>>> {
        let i = self.index(x, y)?;
        Ok(self.cells[i].take())
    }

    /// Occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, Coord, &Arc<EntityType>)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref()
                .map(|e| ((i % width) as Coord, (i / width) as Coord, e))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Arc<EntityType>>]> + '_ {
        self.cells.chunks(self.width.max(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ResourceMap;

    fn tree() -> Arc<EntityType> {
        Arc::new(EntityType {
            id: "tree".into(),
            name: "Tree".into(),
            icon: String::new(),
            description: String::new(),
            cost: ResourceMap::new(),
            effects: ResourceMap::new(),
        })
    }

    #[test]
    fn rejects_negative_and_edge_coordinates() {
        let grid = Grid::new(5, 5);
        assert!(grid.in_bounds(0, 0));
        assert!(grid.in_bounds(4, 4));
        assert!(!grid.in_bounds(5, 0));
        assert!(!grid.in_bounds(0, 5));
        assert!(!grid.in_bounds(-1, 2));
        assert!(matches!(grid.get(5, 0), Err(SimError::OutOfBounds { x: 5, .. })));
    }

    #[test]
    fn put_never_overwrites() {
        let mut grid = Grid::new(3, 2);
        grid.put(1, 1, tree()).unwrap();
        assert!(matches!(
            grid.put(1, 1, tree()),
            Err(SimError::CellOccupied { x: 1, y: 1 })
        ));
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn occupied_walks_row_major() {
        let mut grid = Grid::new(3, 2);
        grid.put(2, 0, tree()).unwrap();
        grid.put(0, 1, tree()).unwrap();
        grid.put(0, 0, tree()).unwrap();
        let coords: Vec<_> = grid.occupied().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (2, 0), (0, 1)]);
    }

    #[test]
    fn same_type_shares_one_allocation() {
        let mut grid = Grid::new(2, 1);
        let t = tree();
        grid.put(0, 0, Arc::clone(&t)).unwrap();
        grid.put(1, 0, Arc::clone(&t)).unwrap();
        assert_eq!(Arc::strong_count(&t), 3);
    }
}
