//! Temporary workspaces holding campaign, location and database inputs.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::TimeDelta;
use geo::Coord;
use reach_core::test_support::{campaign, confirmed, contact, paris, reference_now};
use reach_core::{Campaign, HistoryEntry, RankingMode, User};
use reach_notify::Location;
use reach_store::{initialise_schema, insert_match, insert_user};
use rusqlite::Connection;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).expect("write fixture file");
}

/// Temporary directory with conventional input paths.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn campaign_path(&self) -> Utf8PathBuf {
        self.root.join("campaign.json")
    }

    pub(super) fn database_path(&self) -> Utf8PathBuf {
        self.root.join("population.db")
    }

    pub(super) fn location_path(&self) -> Utf8PathBuf {
        self.root.join("location.json")
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write_campaign(&self, campaign: &Campaign) {
        let payload = serde_json::to_string_pretty(campaign).expect("serialize campaign");
        write_utf8(&self.campaign_path(), payload.as_bytes());
    }

    pub(super) fn write_location(&self, location: &Location) {
        let payload = serde_json::to_string_pretty(location).expect("serialize location");
        write_utf8(&self.location_path(), payload.as_bytes());
    }

    pub(super) fn write_population(&self, users: &[User], history: &[HistoryEntry]) {
        let mut conn = Connection::open(self.database_path()).expect("create database");
        initialise_schema(&mut conn).expect("create schema");
        for user in users {
            insert_user(&conn, user).expect("insert user");
        }
        for entry in history {
            insert_match(&conn, &entry.contact).expect("insert match");
        }
    }

    /// Users 1 and 3 in central Paris, user 2 six kilometres north and
    /// user 3 offered the campaign's vaccine a month ago.
    pub(super) fn write_worked_example(&self, ranking_mode: RankingMode) {
        self.write_campaign(&campaign(ranking_mode));
        let north = Coord {
            x: 2.3522,
            y: 48.9109,
        };
        let users = [confirmed(1, paris()), confirmed(2, north), confirmed(3, paris())];
        let history = [contact(1, 3, "pfizer", reference_now() - TimeDelta::days(30))];
        self.write_population(&users, &history);
    }
}
