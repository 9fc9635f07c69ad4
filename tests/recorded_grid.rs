mod common;

use std::fs;

use common::*;
use pleme_clusterscope::commands::grid::{grid_state, load_grid, GridSource, GridView};

#[tokio::test]
async fn grid_from_recorded_response_and_inventory_files() {
    let dir = tempfile::tempdir().unwrap();

    let inventory = dir.path().join("clusters.yaml");
    let clusters = vec![
        monitored("edge-1", "logs"),
        monitored("edge-2", "logs"),
        unmonitored("lab"),
    ];
    fs::write(&inventory, serde_yaml::to_string(&clusters).unwrap()).unwrap();

    let response = dir.path().join("response.json");
    let recorded = batch(vec![table_response(
        "0",
        vec![
            healthy_row(&resource_id("edge-1")),
            row(
                &resource_id("edge-2"),
                statuses(&[("Green", 3)]),
                serde_json::Value::Null,
                statuses(&[("Green", 4), ("Red", 1)]),
            ),
        ],
    )]);
    fs::write(&response, serde_json::to_string(&recorded).unwrap()).unwrap();

    let config = dir.path().join("config.yaml");
    fs::write(&config, "engine:\n  lookback_hours: 2\n").unwrap();

    let source = GridSource {
        config: Some(config.display().to_string()),
        inventory: Some(inventory),
        response: Some(response),
    };
    let service = load_grid(&source).await.unwrap();

    let view = GridView {
        sort: Some("system-pods".to_string()),
        ..GridView::default()
    };
    let state = grid_state(&service, &view).await.unwrap();
    let rows: Vec<_> = state
        .rows
        .iter()
        .map(|r| (r.name.as_str(), r.user_pods.as_str(), r.system_pods.as_str()))
        .collect();
    assert_eq!(
        rows,
        [("edge-2", "0", "4/5"), ("edge-1", "10/10", "5/5"), ("lab", "", "")]
    );
    assert_eq!(state.summary.critical, 1);
    assert_eq!(state.summary.healthy, 1);
    assert_eq!(state.summary.unmonitored, 1);
}

#[tokio::test]
async fn bad_view_arguments_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = dir.path().join("clusters.yaml");
    fs::write(&inventory, "clusters: []\n").unwrap();
    let response = dir.path().join("response.json");
    fs::write(&response, r#"{"responses": []}"#).unwrap();

    let source = GridSource {
        config: Some(dir.path().join("absent.yaml").display().to_string()),
        inventory: Some(inventory),
        response: Some(response),
    };
    let service = load_grid(&source).await.unwrap();

    let view = GridView {
        status: Some("purple".to_string()),
        ..GridView::default()
    };
    let err = grid_state(&service, &view).await.unwrap_err();
    assert!(err.to_string().contains("purple"));
}
