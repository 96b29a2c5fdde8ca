//! Shared test harness modules for the `reach` CLI.

use super::*;

mod helpers;
mod select_unit;
