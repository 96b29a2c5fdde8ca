//! Focused unit tests covering select and count configuration and output.

use super::helpers::{Workspace, write_utf8};
use super::*;
use crate::select::{
    CountReport, SelectConfig, SelectionReport, load_campaign, run_count_with, run_select_with,
    select_config_from_layers_for_test,
};
use reach_core::test_support::reference_now;
use reach_core::{CampaignId, ConfigurationError, ExclusionPolicy, RankingMode, UniformGrid, UserId};
use rstest::rstest;

fn args_for(workspace: &Workspace) -> SelectArgs {
    SelectArgs {
        campaign_path: Some(workspace.campaign_path()),
        database: Some(workspace.database_path()),
        ..SelectArgs::default()
    }
}

#[rstest]
#[case::campaign(None, Some("population.db".into()), ARG_CAMPAIGN, ENV_SELECT_CAMPAIGN)]
#[case::database(Some("campaign.json".into()), None, ARG_DATABASE, ENV_SELECT_DATABASE)]
fn converting_select_without_required_fields_errors(
    #[case] campaign_path: Option<camino::Utf8PathBuf>,
    #[case] database: Option<camino::Utf8PathBuf>,
    #[case] expected_field: &'static str,
    #[case] expected_env: &'static str,
) {
    let args = SelectArgs {
        campaign_path,
        database,
        ..SelectArgs::default()
    };
    let err = SelectConfig::try_from(args).expect_err("missing field should error");
    assert!(
        matches!(
            err,
            CliError::MissingArgument { field, env }
                if field == expected_field && env == expected_env
        ),
        "expected MissingArgument, found {err:?}"
    );
}

#[rstest]
fn converting_count_reports_count_environment() {
    let args = CountArgs {
        campaign_path: Some("campaign.json".into()),
        database: None,
    };
    let err = SelectConfig::try_from(args).expect_err("missing database should error");
    assert!(matches!(
        err,
        CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_COUNT_DATABASE
        }
    ));
}

#[rstest]
fn select_config_applies_defaults() {
    let workspace = Workspace::new();
    let config = SelectConfig::try_from(args_for(&workspace)).expect("config should build");
    assert_eq!(config.policy, ExclusionPolicy::default());
    assert_eq!(config.grid, UniformGrid::default());
    assert_eq!(config.limit, None);
    assert_eq!(config.seed, None);
}

#[rstest]
fn select_config_rejects_non_positive_cell_size() {
    let workspace = Workspace::new();
    let args = SelectArgs {
        cell_degrees: Some(0.0),
        ..args_for(&workspace)
    };
    let err = SelectConfig::try_from(args).expect_err("zero cell size should error");
    assert!(matches!(
        err,
        CliError::InvalidSettings(ConfigurationError::InvalidCellSize { .. })
    ));
}

#[rstest]
fn validate_sources_reports_missing_database() {
    let workspace = Workspace::new();
    write_utf8(&workspace.campaign_path(), b"{}");
    let config = SelectConfig::try_from(args_for(&workspace)).expect("config should build");
    let err = config.validate_sources().expect_err("database is missing");
    assert!(matches!(
        err,
        CliError::MissingSourceFile {
            field: ARG_DATABASE,
            ..
        }
    ));
}

#[rstest]
fn validate_sources_reports_directories() {
    let workspace = Workspace::new();
    std::fs::create_dir(workspace.campaign_path()).expect("campaign directory");
    let config = SelectConfig::try_from(args_for(&workspace)).expect("config should build");
    let err = config.validate_sources().expect_err("directory is not a file");
    assert!(matches!(
        err,
        CliError::SourcePathNotFile {
            field: ARG_CAMPAIGN,
            ..
        }
    ));
}

#[rstest]
fn load_campaign_rejects_invalid_json() {
    let workspace = Workspace::new();
    let path = workspace.campaign_path();
    write_utf8(&path, b"{ not valid json");
    let err = load_campaign(&path).expect_err("invalid json should error");
    assert!(matches!(err, CliError::ParseInput { path: found, .. } if found == path));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "limit": "many" }));

    let err = select_config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert!(matches!(err, CliError::Configuration(_)));
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let workspace = Workspace::new();
    let root = workspace.root();
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": root.join("from-file.db").as_str(),
            "exclusion_hours": 48,
        }),
        None,
    );
    composer.push_environment(json!({
        "campaign_path": root.join("from-env.json").as_str(),
        "database": root.join("from-env.db").as_str(),
    }));
    composer.push_cli(json!({ "limit": 25 }));

    let config =
        select_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.campaign_path, root.join("from-env.json"));
    assert_eq!(config.database, root.join("from-env.db"));
    assert_eq!(config.limit, Some(25));
    assert_eq!(
        config.policy,
        ExclusionPolicy::from_hours(48).expect("valid period")
    );
}

#[rstest]
fn select_prints_the_ranked_candidates() {
    let workspace = Workspace::new();
    workspace.write_worked_example(RankingMode::Scored);
    let args = SelectArgs {
        limit: Some(2),
        seed: Some(7),
        ..args_for(&workspace)
    };

    let mut stdout = Vec::new();
    run_select_with(args, reference_now(), &mut stdout).expect("select should succeed");

    let report: SelectionReport =
        serde_json::from_slice(&stdout).expect("output should be a selection report");
    assert_eq!(
        report,
        SelectionReport {
            campaign_id: CampaignId(1),
            ranking_mode: RankingMode::Scored,
            seed: 7,
            user_ids: vec![UserId(1), UserId(2)],
        }
    );
}

#[rstest]
fn random_selection_is_reproducible_for_a_seed() {
    let workspace = Workspace::new();
    workspace.write_worked_example(RankingMode::Random);
    let run = || {
        let args = SelectArgs {
            seed: Some(99),
            ..args_for(&workspace)
        };
        let mut stdout = Vec::new();
        run_select_with(args, reference_now(), &mut stdout).expect("select should succeed");
        serde_json::from_slice::<SelectionReport>(&stdout).expect("selection report")
    };

    let first = run();
    assert_eq!(first, run());
    let mut ids = first.user_ids;
    ids.sort_unstable();
    assert_eq!(ids, vec![UserId(1), UserId(2), UserId(3)]);
}

#[rstest]
fn count_prints_the_estimate() {
    let workspace = Workspace::new();
    workspace.write_worked_example(RankingMode::Scored);
    let args = CountArgs {
        campaign_path: Some(workspace.campaign_path()),
        database: Some(workspace.database_path()),
    };

    let mut stdout = Vec::new();
    run_count_with(args, reference_now(), &mut stdout).expect("count should succeed");

    let report: CountReport = serde_json::from_slice(&stdout).expect("count report");
    assert_eq!(
        report,
        CountReport {
            campaign_id: CampaignId(1),
            estimated_count: 3,
        }
    );
}
