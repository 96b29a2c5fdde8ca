#![expect(
    clippy::expect_used,
    reason = "integration tests use expect for readable failures"
)]

//! End-to-end selection and counting against an in-memory population.

use chrono::TimeDelta;
use geo::Coord;
use rstest::{fixture, rstest};
use reach_core::test_support::{
    FixedCovering, MemoryPopulation, campaign, confirmed, contact, paris, reference_now, user,
};
use reach_core::{
    Campaign, CampaignStatus, ExclusionPolicy, HistoryEntry, RankingMode, ReachEngine,
    SelectionRequest, UniformGrid, User, UserId,
};

/// Roughly six kilometres north of the campaign location.
fn six_km_north() -> Coord<f64> {
    Coord {
        x: 2.3522,
        y: 48.9109,
    }
}

/// Roughly ten and a half kilometres north: outside the radius but inside a
/// covered grid cell.
fn just_outside_radius() -> Coord<f64> {
    Coord {
        x: 2.3522,
        y: 48.952,
    }
}

fn select(
    users: Vec<User>,
    history: Vec<HistoryEntry>,
    target: &Campaign,
    request: &SelectionRequest,
) -> Vec<UserId> {
    let engine = ReachEngine::new(MemoryPopulation::new(users, history), UniformGrid::default());
    engine
        .select_candidates(target, request)
        .expect("selection succeeds")
}

fn count(users: Vec<User>, history: Vec<HistoryEntry>, target: &Campaign) -> usize {
    let engine = ReachEngine::new(MemoryPopulation::new(users, history), UniformGrid::default());
    engine
        .estimate_candidate_count(target, reference_now())
        .expect("count succeeds")
}

#[fixture]
fn request() -> SelectionRequest {
    SelectionRequest::new(reference_now()).with_seed(17)
}

#[rstest]
fn scored_ranking_prefers_fewer_category_contacts_then_proximity(request: SelectionRequest) {
    let a = user(1);
    let b = confirmed(2, six_km_north());
    let c = user(3);
    let history = vec![contact(1, 3, "pfizer", reference_now() - TimeDelta::days(30))];

    let selected = select(
        vec![c, b, a],
        history,
        &campaign(RankingMode::Scored),
        &request.with_limit(2),
    );
    assert_eq!(selected, vec![UserId(1), UserId(2)]);
}

#[rstest]
#[case(RankingMode::Scored)]
#[case(RankingMode::Random)]
fn contact_two_hours_ago_excludes_the_user(
    request: SelectionRequest,
    #[case] mode: RankingMode,
) {
    let history = vec![contact(1, 1, "moderna", reference_now() - TimeDelta::hours(2))];
    let selected = select(vec![user(1), user(2)], history, &campaign(mode), &request);
    assert_eq!(selected, vec![UserId(2)]);
}

#[rstest]
#[case(RankingMode::Scored)]
#[case(RankingMode::Random)]
fn contact_from_canceled_campaign_does_not_exclude(
    request: SelectionRequest,
    #[case] mode: RankingMode,
) {
    let mut entry = contact(1, 1, "pfizer", reference_now() - TimeDelta::hours(2));
    entry.campaign_status = CampaignStatus::Canceled;
    let selected = select(vec![user(1)], vec![entry], &campaign(mode), &request);
    assert_eq!(selected, vec![UserId(1)]);
}

#[rstest]
#[case(RankingMode::Scored)]
#[case(RankingMode::Random)]
fn confirmed_match_from_long_ago_excludes_forever(
    request: SelectionRequest,
    #[case] mode: RankingMode,
) {
    let mut entry = contact(1, 1, "moderna", reference_now() - TimeDelta::days(400));
    entry.contact.confirmed_at = Some(reference_now() - TimeDelta::days(399));
    let selected = select(
        vec![user(1), user(2)],
        vec![entry.clone()],
        &campaign(mode),
        &request,
    );
    assert_eq!(selected, vec![UserId(2)]);
    assert_eq!(
        count(vec![user(1), user(2)], vec![entry], &campaign(mode)),
        1
    );
}

#[rstest]
fn count_ignores_recent_contacts() {
    let history = vec![contact(1, 1, "pfizer", reference_now() - TimeDelta::hours(2))];
    assert_eq!(
        count(
            vec![user(1), user(2)],
            history,
            &campaign(RankingMode::Scored)
        ),
        2
    );
}

#[rstest]
fn count_uses_the_true_radius() {
    let users = vec![user(1), confirmed(2, just_outside_radius())];
    assert_eq!(count(users, Vec::new(), &campaign(RankingMode::Random)), 1);
}

#[rstest]
fn random_sampling_trusts_the_grid_covering(request: SelectionRequest) {
    let outside = confirmed(1, just_outside_radius());
    let scored = select(
        vec![outside.clone()],
        Vec::new(),
        &campaign(RankingMode::Scored),
        &request,
    );
    let random = select(
        vec![outside],
        Vec::new(),
        &campaign(RankingMode::Random),
        &request,
    );
    assert!(scored.is_empty());
    assert_eq!(random, vec![UserId(1)]);
}

#[rstest]
#[case(RankingMode::Scored)]
#[case(RankingMode::Random)]
fn users_outside_the_covering_are_never_selected(
    request: SelectionRequest,
    #[case] mode: RankingMode,
) {
    let grid = UniformGrid::default();
    let nearby = confirmed(2, six_km_north());
    assert_ne!(nearby.cell, grid.cell_for(paris()));
    let engine = ReachEngine::new(
        MemoryPopulation::new(vec![user(1), nearby], Vec::new()),
        FixedCovering::new([grid.cell_for(paris())]),
    );

    let selected = engine
        .select_candidates(&campaign(mode), &request)
        .expect("selection succeeds");
    assert_eq!(selected, vec![UserId(1)]);
    assert_eq!(
        engine
            .estimate_candidate_count(&campaign(mode), reference_now())
            .expect("count succeeds"),
        2
    );
}

#[rstest]
#[case(RankingMode::Scored)]
#[case(RankingMode::Random)]
fn age_window_bounds_are_inclusive(request: SelectionRequest, #[case] mode: RankingMode) {
    let today = reference_now().date_naive();
    let mut youngest = user(1);
    youngest.birth_date = today
        .checked_sub_months(chrono::Months::new(18 * 12))
        .expect("valid date");
    let mut too_young = user(2);
    too_young.birth_date = youngest.birth_date.succ_opt().expect("valid date");

    let selected = select(vec![youngest, too_young], Vec::new(), &campaign(mode), &request);
    assert_eq!(selected, vec![UserId(1)]);
}

#[rstest]
fn unconfirmed_and_anonymised_users_are_never_selected(request: SelectionRequest) {
    let mut pending = user(1);
    pending.confirmed_at = None;
    let mut erased = user(2);
    erased.anonymized_at = Some(reference_now() - TimeDelta::days(1));

    let selected = select(
        vec![pending, erased, user(3)],
        Vec::new(),
        &campaign(RankingMode::Scored),
        &request,
    );
    assert_eq!(selected, vec![UserId(3)]);
}

#[rstest]
fn longer_exclusion_period_reaches_further_back(request: SelectionRequest) {
    let history = vec![contact(1, 1, "pfizer", reference_now() - TimeDelta::hours(30))];
    let engine = ReachEngine::new(
        MemoryPopulation::new(vec![user(1)], history),
        UniformGrid::default(),
    );
    let target = campaign(RankingMode::Scored);

    let default_window = engine
        .select_candidates(&target, &request)
        .expect("selection succeeds");
    assert_eq!(default_window, vec![UserId(1)]);

    let strict = engine.with_policy(ExclusionPolicy::from_hours(48).expect("valid period"));
    let wide_window = strict
        .select_candidates(&target, &request)
        .expect("selection succeeds");
    assert!(wide_window.is_empty());
}

#[rstest]
fn random_sampling_is_reproducible_for_a_seed(request: SelectionRequest) {
    let users: Vec<_> = (1..=30).map(user).collect();
    let target = campaign(RankingMode::Random);
    let first = select(users.clone(), Vec::new(), &target, &request.with_limit(10));
    let second = select(users, Vec::new(), &target, &request.with_limit(10));
    assert_eq!(first, second);
    assert_eq!(first.len(), 10);
}

#[rstest]
fn missing_limit_returns_the_whole_ranked_set(request: SelectionRequest) {
    let users = vec![user(1), confirmed(2, paris()), confirmed(3, six_km_north())];
    let selected = select(users, Vec::new(), &campaign(RankingMode::Scored), &request);
    assert_eq!(selected, vec![UserId(1), UserId(2), UserId(3)]);
}
