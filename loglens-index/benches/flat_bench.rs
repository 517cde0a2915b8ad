// Copyright 2025 Loglens Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Throughput check for the exact flat index.
//!
//! Run with: cargo bench -p loglens-index --bench flat_bench

use loglens_index::{FlatIndex, VectorIndex};
use std::time::Instant;

fn generate_vector(dim: usize, seed: usize) -> Vec<f32> {
    (0..dim)
        .map(|i| ((seed * 7 + i * 13) % 100) as f32 / 100.0)
        .collect()
}

fn main() {
    let dim = 384;
    let num_vectors = 10_000;
    let searches = 100;

    let vectors: Vec<Vec<f32>> = (0..num_vectors)
        .map(|i| generate_vector(dim, i))
        .collect();

    let start = Instant::now();
    let mut index = FlatIndex::with_dimension(dim);
    index.add(vectors).unwrap();
    let build_time = start.elapsed();

    println!(
        "Build: {num_vectors} vectors x {dim} dims in {build_time:?} ({} vecs/sec)",
        (num_vectors as f64 / build_time.as_secs_f64()) as u64
    );

    let query = generate_vector(dim, 42);
    let start = Instant::now();
    for _ in 0..searches {
        let hits = index.search(&query, 10);
        assert_eq!(hits.len(), 10);
    }
    let search_time = start.elapsed();

    println!(
        "Search: {searches} queries over {num_vectors} vectors in {search_time:?} ({:.1} queries/sec)",
        searches as f64 / search_time.as_secs_f64()
    );

    let start = Instant::now();
    let bytes = index.to_bytes().unwrap();
    let restored = FlatIndex::from_bytes(&bytes).unwrap();
    let roundtrip_time = start.elapsed();

    println!(
        "Serialize round trip: {} bytes in {roundtrip_time:?} (restored {} vectors)",
        bytes.len(),
        restored.len()
    );
}
