//! Database integration tests.

use super::paste::InsertOutcome;
use super::*;
use crate::test_support::{record, record_created_at, setup_temp_db};
use chrono::{Duration, Utc};
use std::sync::{Arc, Barrier};
use std::thread;

mod expiry;
