use crate::math::{Point, Real, Vector};
use hashbrown::HashMap;

/// A dense block of voxel values stored by a [`SparseGrid`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct GridChunk {
    pub(crate) values: Box<[Real]>,
}

impl GridChunk {
    pub(crate) const VOXELS_PER_CHUNK_DIM: usize = 8;
    pub(crate) const VOXELS_PER_CHUNK: usize =
        Self::VOXELS_PER_CHUNK_DIM * Self::VOXELS_PER_CHUNK_DIM * Self::VOXELS_PER_CHUNK_DIM;

    pub(crate) fn filled(value: Real) -> Self {
        Self {
            values: vec![value; Self::VOXELS_PER_CHUNK].into_boxed_slice(),
        }
    }

    /// The key of the voxel at the given linearized index within the chunk `chunk_key`.
    pub(crate) fn voxel_key_at_id(chunk_key: Point<i32>, id_in_chunk: usize) -> Point<i32> {
        let d0d1 = Self::VOXELS_PER_CHUNK_DIM * Self::VOXELS_PER_CHUNK_DIM;
        let z = id_in_chunk / d0d1;
        let y = (id_in_chunk - z * d0d1) / Self::VOXELS_PER_CHUNK_DIM;
        let x = id_in_chunk % Self::VOXELS_PER_CHUNK_DIM;
        chunk_key * (Self::VOXELS_PER_CHUNK_DIM as i32) + Vector::new(x as i32, y as i32, z as i32)
    }
}

/// A sparse, unbounded 3D grid of scalar values.
///
/// Voxels are grouped into 8×8×8 chunks that are only allocated once one of their voxels is
/// written. Every voxel that was never written reads as the grid's `background` value.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseGrid {
    #[cfg_attr(
        feature = "serde-serialize",
        serde(with = "crate::utils::hashmap_entries")
    )]
    pub(crate) chunks: HashMap<Point<i32>, GridChunk>,
    background: Real,
}

impl SparseGrid {
    /// Creates an empty grid where every voxel reads as `background`.
    pub fn new(background: Real) -> Self {
        Self {
            chunks: HashMap::default(),
            background,
        }
    }

    /// The value of every voxel that was never written.
    #[inline]
    pub fn background(&self) -> Real {
        self.background
    }

    /// Does this grid contain no allocated chunk at all?
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The number of allocated chunks.
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn voxel_to_chunk_key(voxel_key: Point<i32>) -> Point<i32> {
        fn div_floor(a: i32, b: usize) -> i32 {
            let sign = (a < 0) as i32;
            (a + sign) / b as i32 - sign
        }

        voxel_key.map(|e| div_floor(e, GridChunk::VOXELS_PER_CHUNK_DIM))
    }

    /// Given a voxel key, returns the key of the chunk that contains it, as well as the
    /// linear index of the voxel within that chunk.
    pub(crate) fn chunk_key_and_id_in_chunk(voxel_key: Point<i32>) -> (Point<i32>, usize) {
        let chunk_key = Self::voxel_to_chunk_key(voxel_key);
        // NOTE: always positive since we subtracted the smallest possible key on that chunk.
        let voxel_key_in_chunk = voxel_key - chunk_key * GridChunk::VOXELS_PER_CHUNK_DIM as i32;
        let id_in_chunk = (voxel_key_in_chunk.x
            + voxel_key_in_chunk.y * GridChunk::VOXELS_PER_CHUNK_DIM as i32
            + voxel_key_in_chunk.z
                * GridChunk::VOXELS_PER_CHUNK_DIM as i32
                * GridChunk::VOXELS_PER_CHUNK_DIM as i32) as usize;
        (chunk_key, id_in_chunk)
    }

    /// The chunk with the given chunk key, if it was allocated.
    #[inline]
    pub(crate) fn chunk(&self, chunk_key: &Point<i32>) -> Option<&GridChunk> {
        self.chunks.get(chunk_key)
    }

    /// The value stored at the given voxel.
    ///
    /// This is a fresh lookup without any cached state, so it can be called concurrently.
    pub fn value(&self, voxel_key: Point<i32>) -> Real {
        let (chunk_key, id_in_chunk) = Self::chunk_key_and_id_in_chunk(voxel_key);
        self.chunks
            .get(&chunk_key)
            .map(|chunk| chunk.values[id_in_chunk])
            .unwrap_or(self.background)
    }

    /// Sets the value of the given voxel, allocating its chunk if needed.
    pub fn set_value(&mut self, voxel_key: Point<i32>, value: Real) {
        let (chunk_key, id_in_chunk) = Self::chunk_key_and_id_in_chunk(voxel_key);
        let background = self.background;
        let chunk = self
            .chunks
            .entry(chunk_key)
            .or_insert_with(|| GridChunk::filled(background));
        chunk.values[id_in_chunk] = value;
    }

    /// Stores a whole chunk, replacing the one with the same key if any.
    pub(crate) fn insert_chunk(&mut self, chunk_key: Point<i32>, chunk: GridChunk) {
        let _ = self.chunks.insert(chunk_key, chunk);
    }

    /// Lowers the value of the given voxel to `value` if it is smaller than the current one.
    pub fn min_value(&mut self, voxel_key: Point<i32>, value: Real) {
        if value < self.value(voxel_key) {
            self.set_value(voxel_key, value);
        }
    }

    /// Combines `other` into `self` by keeping, for each voxel, the smallest of both values.
    ///
    /// This is the CSG union of two signed distance grids sharing the same background.
    pub fn union(&mut self, other: &SparseGrid) {
        for (chunk_key, other_chunk) in other.chunks.iter() {
            match self.chunks.get_mut(chunk_key) {
                Some(chunk) => {
                    for (value, other_value) in
                        chunk.values.iter_mut().zip(other_chunk.values.iter())
                    {
                        if *other_value < *value {
                            *value = *other_value;
                        }
                    }
                }
                None => {
                    let mut chunk = GridChunk::filled(self.background);
                    for (value, other_value) in
                        chunk.values.iter_mut().zip(other_chunk.values.iter())
                    {
                        *value = other_value.min(self.background);
                    }
                    let _ = self.chunks.insert(*chunk_key, chunk);
                }
            }
        }
    }

    /// Iterates through all the voxels with a value different from the background.
    pub fn active_voxels(&self) -> impl Iterator<Item = (Point<i32>, Real)> + '_ {
        self.chunks.iter().flat_map(move |(chunk_key, chunk)| {
            chunk
                .values
                .iter()
                .enumerate()
                .filter(move |(_, value)| **value != self.background)
                .map(move |(id, value)| (GridChunk::voxel_key_at_id(*chunk_key, id), *value))
        })
    }

    /// The number of voxels with a value different from the background.
    pub fn num_active_voxels(&self) -> usize {
        self.chunks
            .values()
            .map(|chunk| {
                chunk
                    .values
                    .iter()
                    .filter(|value| **value != self.background)
                    .count()
            })
            .sum()
    }

    /// An approximation of the memory usage (in bytes) for this struct plus
    /// the memory it allocates dynamically.
    pub fn total_memory_size(&self) -> usize {
        size_of::<Self>() + self.heap_memory_size()
    }

    /// An approximation of the memory dynamically-allocated by this struct.
    pub fn heap_memory_size(&self) -> usize {
        // NOTE: if a new field is added to `Self`, adjust this function result.
        let Self {
            chunks,
            background: _,
        } = self;
        chunks.capacity() * (size_of::<Point<i32>>() + size_of::<GridChunk>())
            + chunks.len() * GridChunk::VOXELS_PER_CHUNK * size_of::<Real>()
    }
}
