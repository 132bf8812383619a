//! Tests for the coverage, ordering, and determinism of chunk plans over many source sizes and chunk sizes.

use std::ops::Range;

use chunkplan::{
    ChunkPlan, ChunkRequest, ConcatOrder, DatasetLayout, DimensionSlice, PlanOptions, Planner,
    SourceDataset,
};

const SOURCE_SIZES: &[&[u64]] = &[
    &[1],
    &[5],
    &[2, 2],
    &[2, 1, 3, 1],
    &[1, 1, 1, 1, 1, 1],
    &[7, 0, 4],
    &[0, 3],
    &[10, 10, 10],
    &[3, 8, 2, 9, 1],
];

const CHUNK_SIZES: &[u64] = &[1, 2, 3, 4, 5, 7, 64];

fn planner(sizes: &[u64]) -> Planner {
    let sources = sizes.iter().map(|&size| {
        SourceDataset::new(
            DatasetLayout::new()
                .with_dimension("time", size, None)
                .with_dimension("x", 2, None)
                .with_variable("var", ["time", "x"])
                .with_variable("series", ["time"])
                .with_variable("x_coord", ["x"]),
        )
    });
    let planner = Planner::from_sources(sources).unwrap();
    if sizes.len() > 1 {
        planner.concat("time", ConcatOrder::Manual).unwrap()
    } else {
        planner
    }
}

fn plan(planner: &Planner, chunk_size: u64, concurrent_limit: usize) -> ChunkPlan {
    let request = ChunkRequest::from([("time".to_string(), chunk_size)]);
    let options = PlanOptions::default()
        .with_concurrent_limit(concurrent_limit)
        .with_shared_dimension_index(true);
    planner.map_chunks_opt(&request, &options).unwrap()
}

/// Map source slices back to global offsets along the concatenated dimension.
fn global_ranges(sizes: &[u64], slices: &[DimensionSlice]) -> Vec<Range<u64>> {
    slices
        .iter()
        .map(|slice| {
            let offset: u64 = sizes[..slice.source_index()].iter().sum();
            offset + slice.start()..offset + slice.end()
        })
        .collect()
}

#[test]
fn plan_covers_every_element_once() {
    for &sizes in SOURCE_SIZES {
        let planner = planner(sizes);
        let total: u64 = sizes.iter().sum();
        for &chunk_size in CHUNK_SIZES {
            let request = ChunkRequest::from([("time".to_string(), chunk_size)]);
            let plan = plan(&planner, chunk_size, 1);
            let mut covered = 0;
            for key in plan.keys_for_variable("series") {
                let ranges = global_ranges(sizes, plan.slices(key.as_str(), "time").unwrap());
                let region = planner.chunk_region(key.as_str(), &request).unwrap();
                let mut position = region["time"].start;
                assert_eq!(position, covered, "{sizes:?} {chunk_size} {key}");
                for range in ranges {
                    assert_eq!(range.start, position, "gap or overlap in {key}");
                    assert!(range.end > range.start, "empty slice in {key}");
                    position = range.end;
                }
                assert_eq!(position, region["time"].end, "{sizes:?} {chunk_size} {key}");
                covered = position;
            }
            assert_eq!(covered, total, "{sizes:?} {chunk_size}");
        }
    }
}

#[test]
fn plan_slices_stay_within_sources() {
    for &sizes in SOURCE_SIZES {
        let planner = planner(sizes);
        for &chunk_size in CHUNK_SIZES {
            let plan = plan(&planner, chunk_size, 1);
            for (key, chunk) in &plan {
                // `x_coord` has no time dimension
                let Some(time) = chunk.get("time") else {
                    assert!(key.as_str().starts_with("x_coord/"), "{key}");
                    continue;
                };
                for slice in time {
                    assert!(slice.source_index() < sizes.len(), "{key}");
                    assert!(slice.end() <= sizes[slice.source_index()], "{key}");
                    assert!(!slice.is_empty(), "{key}");
                }
                let source_indices = time
                    .iter()
                    .map(DimensionSlice::source_index)
                    .collect::<Vec<_>>();
                assert!(
                    source_indices.windows(2).all(|pair| pair[0] < pair[1]),
                    "{key} reads sources out of order"
                );
            }
        }
    }
}

#[test]
fn plan_chunk_within_one_source_is_one_slice() {
    let sizes = [6, 6, 6];
    let planner = planner(&sizes);
    let plan = plan(&planner, 3, 1);
    for key in plan.keys_for_variable("series") {
        assert_eq!(plan.slices(key.as_str(), "time").unwrap().len(), 1, "{key}");
    }
}

#[test]
fn plan_chunk_spanning_k_sources() {
    let sizes = [1, 1, 1, 1, 1];
    let planner = planner(&sizes);
    for chunk_size in 1..=5 {
        let plan = plan(&planner, chunk_size, 1);
        let slices = plan.slices("series/0", "time").unwrap();
        assert_eq!(slices.len(), usize::try_from(chunk_size).unwrap());
        for (source_index, slice) in slices.iter().enumerate() {
            assert_eq!(
                (slice.source_index(), slice.start(), slice.end()),
                (source_index, 0, 1)
            );
        }
    }
}

#[test]
fn plan_keys_are_in_c_order() {
    for &sizes in SOURCE_SIZES {
        let planner = planner(sizes);
        for &chunk_size in CHUNK_SIZES {
            let plan = plan(&planner, chunk_size, 1);
            let indices = plan
                .keys_for_variable("var")
                .map(|key| key.chunk_indices())
                .collect::<Vec<_>>();
            assert!(!indices.is_empty());
            assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(indices[0], vec![0, 0]);
        }
    }
}

#[test]
fn plan_is_deterministic() {
    for &sizes in SOURCE_SIZES {
        let planner = planner(sizes);
        for &chunk_size in CHUNK_SIZES {
            let serial = plan(&planner, chunk_size, 1);
            assert_eq!(serial, plan(&planner, chunk_size, 1));
            for concurrent_limit in [2, 3, 8] {
                let parallel = plan(&planner, chunk_size, concurrent_limit);
                assert_eq!(serial, parallel);
                assert!(serial.keys().eq(parallel.keys()));
                assert_eq!(serial.to_json().unwrap(), parallel.to_json().unwrap());
            }
        }
    }
}

#[test]
fn plan_dimension_index_matches_chunks() {
    for &sizes in SOURCE_SIZES {
        let planner = planner(sizes);
        for &chunk_size in CHUNK_SIZES {
            let plan = plan(&planner, chunk_size, 1);
            for key in plan.keys_for_variable("var") {
                let chunk_indices = key.chunk_indices();
                let [time_index, x_index] = chunk_indices[..] else {
                    panic!("unexpected key {key}");
                };
                assert_eq!(
                    plan.dimension_slices("time", time_index),
                    plan.slices(key.as_str(), "time")
                );
                assert_eq!(
                    plan.dimension_slices("x", x_index),
                    plan.slices(key.as_str(), "x")
                );
            }
        }
    }
}

#[test]
fn plan_chunk_slices_matches_plan() {
    let sizes = [2, 1, 3, 1];
    let planner = planner(&sizes);
    let request = ChunkRequest::from([("time".to_string(), 3)]);
    let plan = plan(&planner, 3, 1);
    for (key, chunk) in &plan {
        assert_eq!(&planner.chunk_slices(key.as_str(), &request).unwrap(), chunk);
    }
}
