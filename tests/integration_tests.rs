use station_crowd::config::CrowdConfig;
use station_crowd::estimator::CrowdEstimator;
use station_crowd::fetch::BasicClient;
use station_crowd::output::write_dataset;
use station_crowd::sources::{load_snapshot, load_stations};
use station_crowd::station::Station;
use std::collections::HashMap;
use std::{env, fs};

const STOPS: &str = "tests/fixtures/stops.txt";
const RIDERSHIP_CSV: &str = "tests/fixtures/ridership.csv";
const RIDERSHIP_JSON: &str = "tests/fixtures/ridership.json";

fn crowds(stations: &[Station]) -> HashMap<&str, f64> {
    stations.iter().map(|s| (s.id.as_str(), s.crowd)).collect()
}

#[test]
fn test_full_pipeline_off_peak() {
    let client = BasicClient::new().expect("Failed to build client");
    let records = load_stations(&client, STOPS).expect("Failed to load stops");
    let snapshot = load_snapshot(&client, RIDERSHIP_CSV).expect("Failed to load ridership");
    assert_eq!(snapshot.date(), Some("2024-06-02"));

    let config = CrowdConfig::default();
    let estimate = CrowdEstimator::new(&config, 12)
        .unwrap()
        .estimate(&records, &snapshot);
    let crowd = crowds(&estimate.stations);

    assert_eq!(crowd["AG1"], 0.02);
    assert_eq!(crowd["AG2"], 0.02);
    assert_eq!(crowd["KJ10"], 0.2);
    assert_eq!(crowd["MR1"], 0.0);
    assert_eq!(crowd["BRT1"], 0.0);
    assert_eq!(crowd["X1"], 0.0);

    let summary = &estimate.summary;
    assert!(!summary.is_peak);
    assert_eq!(summary.stations, 9);
    assert_eq!(summary.lines, 5);
    assert_eq!(summary.unmapped_stations, 2);
    assert_eq!(summary.skipped_values, 1);
    assert!(estimate.stations.iter().all(|s| (0.0..=1.0).contains(&s.crowd)));
}

#[test]
fn test_full_pipeline_peak_from_json() {
    let client = BasicClient::new().expect("Failed to build client");
    let records = load_stations(&client, STOPS).unwrap();
    let snapshot = load_snapshot(&client, RIDERSHIP_JSON).unwrap();

    let config = CrowdConfig::default();
    let estimate = CrowdEstimator::new(&config, 18)
        .unwrap()
        .estimate(&records, &snapshot);
    let crowd = crowds(&estimate.stations);

    assert!(estimate.summary.is_peak);
    assert_eq!(crowd["AG1"], 0.03);
    assert_eq!(crowd["KJ13"], 0.3);
    assert_eq!(crowd["MR1"], 0.0);
    // null cells are blank, not malformed
    assert_eq!(estimate.summary.skipped_values, 0);
}

#[test]
fn test_written_dataset_round_trips() {
    let client = BasicClient::new().unwrap();
    let records = load_stations(&client, STOPS).unwrap();
    let snapshot = load_snapshot(&client, RIDERSHIP_CSV).unwrap();
    let config = CrowdConfig::default();
    let estimate = CrowdEstimator::new(&config, 8)
        .unwrap()
        .estimate(&records, &snapshot);

    let dir = format!("{}/station_crowd_it_{}", env::temp_dir().display(), std::process::id());
    let path = format!("{dir}/datasets/station.json");
    write_dataset(&path, &estimate.stations).unwrap();

    let parsed: Vec<Station> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.len(), records.len());
    for (station, record) in parsed.iter().zip(&records) {
        assert_eq!(station.id, record.stop_id);
        assert_eq!(station.name, record.stop_name);
        assert_eq!(station.route_id, record.route_id);
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_source_names_the_input() {
    let client = BasicClient::new().unwrap();

    let err = load_stations(&client, "tests/fixtures/missing_stops.txt").unwrap_err();
    assert!(format!("{err:#}").contains("station source"));

    let err = load_snapshot(&client, "tests/fixtures/missing.csv").unwrap_err();
    assert!(format!("{err:#}").contains("ridership source"));
}
