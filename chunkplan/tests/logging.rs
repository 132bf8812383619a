//! Tests for the log records emitted while concatenating sources and planning chunks.

use chunkplan::{ChunkRequest, ConcatOrder, DatasetLayout, PlanOptions, Planner, SourceDataset};

fn source(time: u64) -> SourceDataset {
    SourceDataset::new(
        DatasetLayout::new()
            .with_dimension("time", time, None)
            .with_dimension("x", 3, Some(2))
            .with_variable("var", ["time", "x"]),
    )
}

fn messages(captured_logs: &[testing_logger::CapturedLog], level: log::Level) -> Vec<&str> {
    captured_logs
        .iter()
        .filter(|log| log.level == level)
        .map(|log| log.body.as_str())
        .collect()
}

#[test]
fn logging_plan() {
    testing_logger::setup();
    let planner = Planner::from_sources([source(2), source(3)])
        .unwrap()
        .concat("time", ConcatOrder::Manual)
        .unwrap();
    let request = ChunkRequest::from([("time".to_string(), 10), ("depth".to_string(), 1)]);
    // Serial planning keeps every record on this thread
    let options = PlanOptions::default().with_concurrent_limit(1);
    let plan = planner.map_chunks_opt(&request, &options).unwrap();
    assert_eq!(plan.len(), 2);

    testing_logger::validate(|captured_logs| {
        assert_eq!(
            messages(captured_logs, log::Level::Warn),
            vec![
                "A chunk size was requested for dimension `depth` which is not in the dataset, ignoring.",
                "The requested chunk size 10 for dimension `time` exceeds its size 5, it will be a single chunk.",
            ]
        );
        let debug = messages(captured_logs, log::Level::Debug);
        assert_eq!(
            debug[0],
            "concatenated 2 sources along dimension `time` with total size 5"
        );
        assert_eq!(debug.len(), 3);
        assert!(debug[1].starts_with("dimension `time` of size 5"));
        assert!(debug[2].starts_with("dimension `x` of size 3"));
    });
}

#[test]
fn logging_quiet_for_valid_request() {
    testing_logger::setup();
    let planner = Planner::from_sources([source(4)]).unwrap();
    let request = ChunkRequest::from([("time".to_string(), 2)]);
    let options = PlanOptions::default().with_concurrent_limit(1);
    planner.map_chunks_opt(&request, &options).unwrap();

    testing_logger::validate(|captured_logs| {
        assert!(messages(captured_logs, log::Level::Warn).is_empty());
        assert_eq!(messages(captured_logs, log::Level::Debug).len(), 2);
    });
}
